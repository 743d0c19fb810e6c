// in build.rs
use clap_complete::{generate_to, shells::Bash, shells::Zsh};
use std::env;
use std::io;

include!("src/cli.rs");

fn main() -> Result<(), io::Error> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut app = make_cli_app();
    generate_to(Bash, &mut app, "otustats", &outdir)?;
    generate_to(Zsh, &mut app, "otustats", &outdir)?;
    Ok(())
}
