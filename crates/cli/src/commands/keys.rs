use std::path::Path;
use std::process;

use envcond_core::{pipeline, referenced_keys};

use crate::{report_core_error, OutputFormat};

pub(crate) fn cmd_keys(file: &Path, output: OutputFormat, quiet: bool) {
    let tree = match pipeline::load_tree(file) {
        Ok(tree) => tree,
        Err(e) => {
            report_core_error(&e, output, quiet);
            process::exit(e.exit_code());
        }
    };

    let keys = referenced_keys(&tree);
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::json!(keys));
        }
        OutputFormat::Text => {
            for key in &keys {
                println!("{}", key);
            }
        }
    }
}
