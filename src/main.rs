use std::fs;

use clap::Parser;
use serde::Deserialize;

use crate::{
    ast::Program,
    commandline::{Operation, Options},
    error::CompileError,
    il::TacProgram,
    prelude::*,
    symbols::SymbolTable,
};

mod ast;
mod builtins;
mod commandline;
mod error;
mod il;
mod listing;
mod prelude;
mod span;
mod symbols;

/// A checked program together with the symbol table semantic analysis produced for it.
#[derive(Debug, Deserialize)]
struct CheckedUnit {
    program: Program,
    symbols: SymbolTable,
}

fn main() -> Result<()> {
    let options = Options::parse();

    stderrlog::new()
        .module(module_path!())
        .verbosity(options.verbose)
        .init()?;

    let unit = load(options.operation.file())?;
    let tac = translate(&unit)?;

    match options.operation {
        Operation::Check { file } => info!("{} lowers cleanly", file),
        Operation::Translate { output: None, .. } => print!("{}", tac),
        Operation::Translate {
            output: Some(path), ..
        } => {
            fs::write(&path, tac.to_string())
                .with_context(|| format!("Could not write output to {}", path))?;
            info!("Wrote {} function(s) to {}", tac.functions.len(), path);
        }
    }

    Ok(())
}

fn load(path: &str) -> Result<CheckedUnit> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read input file {}", path))?;
    parse_unit(&content).with_context(|| format!("Could not load checked program from {}", path))
}

fn parse_unit(content: &str) -> Result<CheckedUnit> {
    Ok(serde_json::from_str(content)?)
}

fn translate(unit: &CheckedUnit) -> Result<TacProgram> {
    match il::translate(&unit.program, &unit.symbols) {
        Ok(tac) => Ok(tac),
        Err(errors) => {
            let count = errors.len();
            for err in errors {
                error!("{}", CompileError::from(err));
            }
            bail!("Lowering failed with {} error(s)", count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINT_42: &str = r#"{
        "program": {
            "classes": [{
                "name": "Main",
                "class": 0,
                "methods": [{
                    "name": "main",
                    "method": 0,
                    "body": { "statements": [
                        { "kind": { "Print": [
                            { "kind": { "Literal": { "Int": 42 } }, "ty": "Int" }
                        ] } }
                    ] }
                }]
            }]
        },
        "symbols": {
            "classes": [{
                "name": "Main",
                "parent": null,
                "size": 4,
                "vtable": "_Main",
                "allocator": "_Main_New"
            }],
            "methods": [{
                "name": "main",
                "class": 0,
                "label": "main",
                "offset": 0,
                "return_type": "Void",
                "is_static": true,
                "this": null,
                "params": []
            }]
        }
    }"#;

    #[test]
    fn json_unit_is_lowered_end_to_end() {
        let unit = parse_unit(PRINT_42).expect("unit should parse");
        let tac = translate(&unit).expect("unit should lower");

        assert_eq!(
            "function main()\n        %1 = 42\n        param %1\n        call _PrintInt\n",
            tac.to_string()
        );
    }

    #[test]
    fn lowering_errors_fail_the_run() {
        let stray_break = PRINT_42.replace(
            r#"{ "kind": { "Print": ["#,
            r#"{ "kind": "Break" }, { "kind": { "Print": ["#,
        );
        let unit = parse_unit(&stray_break).expect("unit should parse");

        assert!(translate(&unit).is_err());
    }

    #[test]
    fn malformed_unit_is_rejected() {
        assert!(parse_unit(r#"{ "program": { "classes": [] } }"#).is_err());
    }
}
