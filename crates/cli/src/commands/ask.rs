//! `sitesage ask`: crawl, answer one question, print.

use sitesage_core::Question;

pub async fn run(question: String, base_url: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    // Reject bad input before spending a crawl on it.
    let question = Question::validate(question)?;

    let config = super::load_config(base_url)?;
    let service = sitesage_gateway::prepare(&config).await?;
    let answer = service.answer(question).await?;

    println!("{}", answer.answer_text);
    println!();
    println!("Sources:");
    for source in &answer.sources {
        println!("  - {source}");
    }
    if let (Some(input), Some(output)) = (answer.usage.input_tokens, answer.usage.output_tokens) {
        println!();
        println!("Tokens: {input} in / {output} out");
    }

    Ok(())
}
