use std::io;

const INDENT: &str = "    ";

/// Builder for multi-line text written to disk (boot scripts, systemd units).
///
/// Invariants:
/// - Each pushed line must not contain `\n`, `\r`, or `\0`.
/// - `build()` joins lines with `\n` and ends with exactly one trailing newline when non-empty.
/// - `open()`/`close()` adjust indentation for the lines pushed in between.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    lines: Vec<String>,
    depth: usize,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one logical line at the current indentation (blank lines stay blank).
    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        let line = line.into();
        if line.is_empty() {
            self.lines.push(line);
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.depth), line));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    /// Push a block opener (`if ...; then`, `for ...; do`) and indent what follows.
    pub fn open(&mut self, line: impl Into<String>) -> &mut Self {
        self.line(line);
        self.depth += 1;
        self
    }

    /// Dedent and push a block closer (`fi`, `done`).
    pub fn close(&mut self, line: impl Into<String>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(line)
    }

    pub fn build(&self) -> io::Result<String> {
        for (i, l) in self.lines.iter().enumerate() {
            if l.contains('\n') || l.contains('\r') || l.contains('\0') {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("generated line {i} contains a newline or NUL"),
                ));
            }
        }
        if self.lines.is_empty() {
            return Ok(String::new());
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}
