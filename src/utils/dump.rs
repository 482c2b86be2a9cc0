//! Raw report dumps for protocol debugging.

/// Format `buf` as rows of 8 bytes: offset range, decimal, then hex.
///
/// ```
/// use aquacomputer_rust_devices::utils::hex_rows;
///
/// let rows = hex_rows(&[4, 0, 255]);
/// assert_eq!(rows, vec!["[00-07]   4   0 255  | 04 00 ff".to_string()]);
/// ```
pub fn hex_rows(buf: &[u8]) -> Vec<String> {
    buf.chunks(8)
        .enumerate()
        .map(|(row, chunk)| {
            let offset = row * 8;
            let dec: Vec<_> = chunk.iter().map(|b| format!("{:3}", b)).collect();
            let hex: Vec<_> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            format!(
                "[{:02}-{:02}] {}  | {}",
                offset,
                offset + 7,
                dec.join(" "),
                hex.join(" ")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_of_eight() {
        let buf: Vec<u8> = (0..66).collect();
        let rows = hex_rows(&buf);
        assert_eq!(rows.len(), 9);
        assert!(rows[1].starts_with("[08-15]"));
        assert!(rows[8].starts_with("[64-71]"));
        assert!(rows[8].ends_with("40 41"));
    }

    #[test]
    fn test_empty() {
        assert!(hex_rows(&[]).is_empty());
    }
}
