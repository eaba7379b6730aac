//! MIME payload encoders for the MHTML writer: quoted-printable with RFC
//! 2045 §6.7 soft line breaks, and base64 wrapped to 76 columns.
//!
//! The quoted-printable implementation tracks the testable worked example in
//! the archiver's own test suite byte-for-byte: only `!`..`<` and `>`..`~`
//! are literal. Whitespace is intentionally *not* exempted — the umlaut
//! scenario (`Die s\u{fc}\u{df}e H\u{fc}ndin ...`) encodes every space as
//! `=20`, so a literal-whitespace exception would fail that case.

const MAX_LINE: usize = 76;

fn is_literal(byte: u8) -> bool {
    (b'!'..=b'<').contains(&byte) || (b'>'..=b'~').contains(&byte)
}

/// Quoted-printable encode `data`, wrapped to 76 columns with CRLF soft line
/// breaks. A `=HH` escape is never split across a line boundary.
pub fn encode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut output: Vec<Vec<u8>> = Vec::new();
    let mut current_line: Vec<u8> = Vec::new();

    for &byte in data {
        if is_literal(byte) {
            current_line.push(byte);
        } else {
            current_line.extend_from_slice(format!("={byte:02X}").as_bytes());
        }

        if current_line.len() >= MAX_LINE {
            let mut head = current_line[..MAX_LINE - 1].to_vec();
            let mut tail = current_line[MAX_LINE - 1..].to_vec();

            if let Some(quoted_pos) = rfind_byte(&head, b'=') {
                if quoted_pos + 2 >= MAX_LINE - 1 {
                    let token = head.split_off(quoted_pos);
                    tail = [token, tail].concat();
                }
            }

            current_line = tail;
            head.push(b'=');
            output.push(head);
        }
    }
    output.push(current_line);

    output.join(&b"\r\n"[..])
}

fn rfind_byte(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().rposition(|&b| b == needle)
}

/// Standard base64 of `data`, wrapped to 76 columns with CRLF between lines.
pub fn encode_base64_wrapped(data: &[u8]) -> Vec<u8> {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    let lines: Vec<&[u8]> = encoded.as_bytes().chunks(MAX_LINE).collect();
    lines.join(&b"\r\n"[..])
}
