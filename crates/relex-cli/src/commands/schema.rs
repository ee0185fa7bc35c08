//! Schema command implementation.

use crate::cli::SchemaArgs;
use crate::error::Result;
use crate::output::Formatter;
use relex_domain::OutputSchema;
use relex_oracle::json_schema;

/// Execute the schema command.
pub fn execute_schema(args: SchemaArgs, formatter: &Formatter) -> Result<()> {
    let schema: OutputSchema = args.name.into();
    println!("{}", formatter.format_json(&json_schema(schema))?);
    Ok(())
}
