//! Compiles every mode's command table (§4.5) to the serialized machine
//! format (§6) at build time, one file per mode under `OUT_DIR`.
//! `src/lib.rs` embeds each with `include_bytes!` and deserializes once in
//! `Dispatcher::new`, so a grammar mistake (ambiguous accept, zero-input
//! accept, too many states) fails the build instead of shipping silently.

use std::env;
use std::fs;
use std::path::Path;

use vir_commands::modes::table_for;
use vir_commands::Mode;
use vir_compile::{compile, serialize};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo for build scripts");

    for mode in Mode::ALL {
        let table = table_for(mode);
        let commands: Vec<(u32, vir_expr::Expr)> = table
            .into_iter()
            .enumerate()
            .map(|(id, spec)| (id as u32, spec.pattern))
            .collect();

        let machine = compile(&commands).unwrap_or_else(|error| {
            panic!("mode {:?} command table failed to compile: {error}", mode);
        });
        let bytes = serialize(&machine);

        let path = Path::new(&out_dir).join(format!("{}.vir_machine", mode.name()));
        fs::write(&path, &bytes)
            .unwrap_or_else(|error| panic!("writing {}: {error}", path.display()));
    }
}
