//! Chunk boundaries must never change the reconstructed text.
//!
//! Every body here is fed whole, then split at every byte offset (including
//! inside multi-byte characters and inside JSON tokens), and byte by byte.

mod common;

use common::{delta_body, text_line};
use lilly::stream::{reconstruct, StreamSession};

fn feed_all(chunks: &[&[u8]]) -> (String, Vec<String>) {
    let mut session = StreamSession::new();
    let mut deltas = Vec::new();
    for chunk in chunks {
        session.feed(chunk, |d| deltas.push(d.to_string()));
    }
    session.finish(|d| deltas.push(d.to_string()));
    (session.into_output(), deltas)
}

fn assert_split_invariant(body: &[u8]) {
    let (whole, whole_deltas) = feed_all(&[body]);

    for i in 0..=body.len() {
        let (output, deltas) = feed_all(&[&body[..i], &body[i..]]);
        assert_eq!(output, whole, "split at byte {}", i);
        assert_eq!(deltas, whole_deltas, "deltas differ for split at byte {}", i);
    }

    let bytes: Vec<&[u8]> = body.chunks(1).collect();
    assert_eq!(feed_all(&bytes).0, whole, "byte-by-byte feed");
}

#[test]
fn test_openai_body_with_multibyte_tokens() {
    let body = delta_body(&[
        "Caf", "é", " ☕", " costs", " 3", "€", ".", " 日本", "語", "!",
    ]);
    let (output, _) = feed_all(&[body.as_bytes()]);
    assert_eq!(output, "Café ☕ costs 3€. 日本語!");
    assert_split_invariant(body.as_bytes());
}

#[test]
fn test_flat_text_body() {
    let body: String = ["The", "fix", "is", "in", "OpenSSL", "3.0.7", "."]
        .iter()
        .map(|t| text_line(t))
        .collect();
    assert_split_invariant(body.as_bytes());
}

#[test]
fn test_plain_text_body_with_crlf() {
    let body = "Patch\r\nyour\r\nservers\r\nnow.\r\n“Quoted” naïve text\r\n";
    assert_split_invariant(body.as_bytes());
}

#[test]
fn test_mixed_framing_and_garbage() {
    let mut body = String::new();
    body.push_str(&text_line("Start"));
    body.push_str("data: {broken json\n");
    body.push_str("\n\n");
    body.push_str("plain ü line\n");
    body.push_str("data: [DONE]\n");
    body.push_str(&text_line("after"));
    body.push_str("data: {\"text\":\"tail without newline\"}");
    assert_split_invariant(body.as_bytes());
}

#[test]
fn test_invalid_bytes_split_anywhere() {
    let mut body = b"data: {\"text\":\"ok\"}\nbad \xff\xfe bytes \xe2\x82 here\n".to_vec();
    body.extend_from_slice("trailing 😀".as_bytes());
    assert_split_invariant(&body);
}

#[test]
fn test_three_way_splits() {
    let body = delta_body(&["Ré", "sumé", " ready", "."]);
    let bytes = body.as_bytes();
    let whole = reconstruct([bytes]);
    assert_eq!(whole, "Résumé ready.");

    for i in 0..=bytes.len() {
        for j in i..=bytes.len() {
            let output = reconstruct([&bytes[..i], &bytes[i..j], &bytes[j..]]);
            assert_eq!(output, whole, "splits at {} and {}", i, j);
        }
    }
}

#[test]
fn test_leading_bom_split_anywhere() {
    let mut body = b"\xEF\xBB\xBF".to_vec();
    body.extend_from_slice(text_line("Hi").as_bytes());
    body.extend_from_slice(text_line("there").as_bytes());

    assert_eq!(reconstruct([body.as_slice()]), "Hi there");
    assert_split_invariant(&body);

    for i in 0..=3 {
        for j in i..=3 {
            let output = reconstruct([&body[..i], &body[i..j], &body[j..]]);
            assert_eq!(output, "Hi there", "splits at {} and {}", i, j);
        }
    }
}

#[test]
fn test_stray_bom_before_later_frame() {
    let mut body = text_line("Hi").into_bytes();
    body.extend_from_slice(b"\xEF\xBB\xBFdata: {\"text\":\"there\"}\n");

    assert_eq!(reconstruct([body.as_slice()]), "Hi there");
    assert_split_invariant(&body);
}
