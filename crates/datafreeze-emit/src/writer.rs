/// Line-oriented builder for brace-delimited source text.
///
/// Indents with four spaces and ends every line with `\n`, whatever the
/// platform, so output bytes only depend on what is written.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    depth: usize,
}

const INDENT: &str = "    ";

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Write `header`, an opening brace, and indent what follows.
    pub fn open(&mut self, header: &str) {
        self.line(header);
        self.line("{");
        self.depth += 1;
    }

    /// Dedent and write a closing brace followed by `suffix` (`;`, `,` or nothing).
    pub fn close(&mut self, suffix: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("}}{suffix}"));
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_blocks_with_four_spaces() {
        let mut writer = CodeWriter::new();
        writer.open("namespace Demo");
        writer.open("public static class Main");
        writer.line("// body");
        writer.close("");
        writer.blank();
        writer.close("");

        assert_eq!(
            writer.into_string(),
            "namespace Demo\n{\n    public static class Main\n    {\n        // body\n    }\n\n}\n"
        );
    }

    #[test]
    fn close_never_underflows() {
        let mut writer = CodeWriter::new();
        writer.close(";");
        assert_eq!(writer.into_string(), "};\n");
    }
}
