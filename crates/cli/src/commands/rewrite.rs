use std::path::PathBuf;
use std::process;

use envcond_core::{pipeline, printer, LayeredEnvironment, ProcessEnvironment};

use crate::{config, report_core_error, report_error, Define, EmitFormat, OutputFormat};

pub(crate) struct RewriteArgs {
    pub file: PathBuf,
    pub define: Vec<Define>,
    pub undefine: Vec<String>,
    pub config: Option<PathBuf>,
    pub allow_unterminated: bool,
    pub compact: bool,
    pub emit: EmitFormat,
}

pub(crate) fn cmd_rewrite(args: &RewriteArgs, output: OutputFormat, quiet: bool) {
    let config = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&e, output, quiet);
            process::exit(1);
        }
    };
    let options = config.options(args.allow_unterminated, args.compact);

    let base = ProcessEnvironment;
    let mut env = LayeredEnvironment::new(&base);
    config.apply(&mut env, &args.define, &args.undefine);

    let tree = match pipeline::rewrite_file(&args.file, &env, &options) {
        Ok(tree) => tree,
        Err(e) => {
            report_core_error(&e, output, quiet);
            process::exit(e.exit_code());
        }
    };

    match args.emit {
        EmitFormat::Source => print!("{}", printer::print_structure(&tree)),
        EmitFormat::Json => {
            let pretty = serde_json::to_string_pretty(&tree)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
    }
}
