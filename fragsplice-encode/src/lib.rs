//! Fragment encoder: file bytes in, byte-array declaration out.
//!
//! The output is a pure function of the file name, the bytes and the
//! dialect, so re-encoding an unchanged input is byte-identical.

use camino::Utf8Path;
use fragsplice_types::{Dialect, FragspliceError, FragspliceResult};
use fs_err as fs;
use tracing::debug;

/// Byte values rendered on each line of the array body.
pub const VALUES_PER_LINE: usize = 12;

const INDENT: &str = "    ";

/// A rendered fragment ready to be written to a fragment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Identifier used for the declaration.
    pub ident: String,
    /// Number of input bytes.
    pub len: usize,
    /// Full source text, newline terminated.
    pub text: String,
}

/// Read `input` and render it as a fragment.
pub fn encode(input: &Utf8Path, dialect: Dialect) -> FragspliceResult<Fragment> {
    let bytes = fs::read(input).map_err(|e| FragspliceError::io(input, e))?;
    let file_name = input.file_name().unwrap_or("fragment");

    debug!(input = %input, bytes = bytes.len(), %dialect, "encoding fragment");

    let text = render_fragment(file_name, &bytes, dialect);
    Ok(Fragment {
        ident: declared_ident(file_name, dialect),
        len: bytes.len(),
        text,
    })
}

/// Render `bytes` as a static array declaration named after `file_name`.
pub fn render_fragment(file_name: &str, bytes: &[u8], dialect: Dialect) -> String {
    let ident = declared_ident(file_name, dialect);
    let mut out = String::new();

    match dialect {
        Dialect::Rust => {
            out.push_str(&format!(
                "pub static {}: [u8; {}] = [",
                ident,
                bytes.len()
            ));
            if bytes.is_empty() {
                out.push_str("];\n");
                return out;
            }
            out.push('\n');
            push_body(&mut out, bytes);
            out.push_str("];\n");
        }
        Dialect::C => {
            if bytes.is_empty() {
                // C has no empty initializers.
                out.push_str(&format!(
                    "static const unsigned char {}[1] = {{ 0x00 }};\n",
                    ident
                ));
            } else {
                out.push_str(&format!("static const unsigned char {}[] = {{\n", ident));
                push_body(&mut out, bytes);
                out.push_str("};\n");
            }
            out.push_str(&format!(
                "static const unsigned int {}_len = {};\n",
                ident,
                bytes.len()
            ));
        }
    }

    out
}

fn push_body(out: &mut String, bytes: &[u8]) {
    for chunk in bytes.chunks(VALUES_PER_LINE) {
        out.push_str(INDENT);
        let values: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
        out.push_str(&values.join(", "));
        out.push_str(",\n");
    }
}

fn declared_ident(file_name: &str, dialect: Dialect) -> String {
    let ident = sanitize_identifier(file_name);
    match dialect {
        Dialect::Rust => ident.to_ascii_uppercase(),
        Dialect::C => ident,
    }
}

/// Turn a file name into a valid identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`; a leading digit gets a `_`
/// prefix. Names with no alphanumeric character at all fall back to
/// `fragment`.
pub fn sanitize_identifier(file_name: &str) -> String {
    let mut ident: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if !ident.chars().any(|c| c.is_ascii_alphanumeric()) {
        ident.insert_str(0, "fragment");
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitizes_file_names() {
        assert_eq!(sanitize_identifier("logo.png"), "logo_png");
        assert_eq!(sanitize_identifier("my-font v2.ttf"), "my_font_v2_ttf");
        assert_eq!(sanitize_identifier("3d.obj"), "_3d_obj");
        assert_eq!(sanitize_identifier("snake_case"), "snake_case");
        assert_eq!(sanitize_identifier(""), "fragment");
        assert_eq!(sanitize_identifier("--"), "fragment__");
    }

    #[test]
    fn non_ascii_characters_are_replaced() {
        assert_eq!(sanitize_identifier("héllo.bin"), "h_llo_bin");
    }

    #[test]
    fn renders_rust_declaration() {
        let out = render_fragment("a.bin", &[0x00, 0xff, 0x10], Dialect::Rust);
        assert_eq!(
            out,
            "pub static A_BIN: [u8; 3] = [\n    0x00, 0xff, 0x10,\n];\n"
        );
    }

    #[test]
    fn renders_c_declaration_with_length() {
        let out = render_fragment("a.bin", &[0x01, 0x02], Dialect::C);
        assert_eq!(
            out,
            "static const unsigned char a_bin[] = {\n    0x01, 0x02,\n};\n\
             static const unsigned int a_bin_len = 2;\n"
        );
    }

    #[test]
    fn wraps_at_twelve_values() {
        let bytes: Vec<u8> = (0u8..25).collect();
        let out = render_fragment("seq", &bytes, Dialect::Rust);
        let lines: Vec<&str> = out.lines().collect();

        // header, 12 + 12 + 1 values, footer
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].matches("0x").count(), 12);
        assert_eq!(lines[2].matches("0x").count(), 12);
        assert_eq!(lines[3], "    0x18,");
        assert_eq!(lines[4], "];");
    }

    #[test]
    fn empty_input_rust() {
        assert_eq!(
            render_fragment("empty", &[], Dialect::Rust),
            "pub static EMPTY: [u8; 0] = [];\n"
        );
    }

    #[test]
    fn empty_input_c_uses_placeholder_element() {
        let out = render_fragment("empty", &[], Dialect::C);
        assert!(out.contains("empty[1] = { 0x00 };"));
        assert!(out.contains("empty_len = 0;"));
    }
}
