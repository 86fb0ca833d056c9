//! Interactive population-size prompts.

use std::io::{BufRead, Write};

use anyhow::{bail, Context};

pub const INVALID_INPUT_HINT: &str = "Enter a positive integer.";

/// Ask for a positive integer until one is given.
///
/// Non-numeric, zero and negative answers re-prompt. Only end of input is an error.
pub fn read_positive_int<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> anyhow::Result<usize> {
    let mut line = String::new();
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;

        line.clear();
        let read = input.read_line(&mut line).context("failed to read from stdin")?;
        if read == 0 {
            bail!("input closed before a positive integer was entered");
        }
        match line.trim().parse::<usize>() {
            Ok(value) if value > 0 => return Ok(value),
            _ => writeln!(output, "{INVALID_INPUT_HINT}")?,
        }
    }
}
