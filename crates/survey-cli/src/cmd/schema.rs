use anyhow::Result;
use clap::Args;
use survey_spec::SurveyDocument;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {}

pub fn run(_args: SchemaArgs) -> Result<()> {
    let schema = schemars::schema_for!(SurveyDocument);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
