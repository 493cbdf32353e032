use std::io::{self, BufRead, Write};

/// Ask whether to proceed with `count` files.
/// Only "y" or "yes" (any case, surrounding whitespace ignored) proceeds;
/// anything else, including end of input, cancels.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, count: usize) -> io::Result<bool> {
    write!(output, "\nProceed to update {} files? (Y/N): ", count)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_uppercase();
    answer == "Y" || answer == "YES"
}
