use std::path::PathBuf;

use colorful::Colorful;

use sheetnetlib::prelude::*;

pub fn execute(table: PathBuf, inputs: PathBuf, outputs: PathBuf) -> anyhow::Result<()> {
    println!("⏳ Converting truth table {table:?}...");

    match convert_truth_table(&table, &inputs, &outputs) {
        Ok(cases) => {
            println!("{}", format!(
                "✅ Converted {} cases of {} inputs and {} outputs",
                cases.len(),
                cases.input_size(),
                cases.output_size()
            ).green());

            println!("  inputs: {inputs:?}");
            println!("  expected outputs: {outputs:?}");
        }

        Err(err) => eprintln!("{}", format!("🧯 Failed to convert truth table: {err}").red())
    }

    Ok(())
}
