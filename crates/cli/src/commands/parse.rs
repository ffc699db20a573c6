use std::path::Path;
use std::process;

use envcond_core::pipeline;

use crate::{report_core_error, OutputFormat};

pub(crate) fn cmd_parse(file: &Path, output: OutputFormat, quiet: bool) {
    match pipeline::load_tree(file) {
        Ok(tree) => {
            let pretty = serde_json::to_string_pretty(&tree)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        Err(e) => {
            report_core_error(&e, output, quiet);
            process::exit(e.exit_code());
        }
    }
}
