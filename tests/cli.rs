// tests/cli.rs

//! Runs the built binary under a pseudo-terminal.

use rexpect::spawn;

const TIMEOUT_MS: Option<u64> = Some(10_000);

fn command(args: &str) -> String {
    format!("{} {}", env!("CARGO_BIN_EXE_serialmon"), args)
}

#[test]
fn test_flist_prints_every_format_char() {
    let mut session = spawn(&command("--flist"), TIMEOUT_MS).expect("spawn serialmon");
    session.exp_string("Available format chars:").unwrap();
    for line in [
        "b  print next byte as binary string",
        "h  print next byte as hexadecimal string",
        "d  print next word as decimal integer",
        "e  use next byte as ascii escape char",
        "t  print tab",
    ] {
        session.exp_string(line).unwrap();
    }
    session.exp_eof().unwrap();
}

#[test]
fn test_invalid_escape_is_rejected() {
    let mut session = spawn(&command("-e ab"), TIMEOUT_MS).expect("spawn serialmon");
    session.exp_string("error").unwrap();
    session.exp_eof().unwrap();
}

#[test]
fn test_missing_port_is_reported() {
    let mut session = spawn(
        &command("-p /dev/does-not-exist-serialmon --no-port-check"),
        TIMEOUT_MS,
    )
    .expect("spawn serialmon");
    session
        .exp_string("Error happened while connecting to port")
        .unwrap();
    session.exp_eof().unwrap();
}
