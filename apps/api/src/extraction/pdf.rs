use crate::extraction::ExtractionError;
use crate::models::document::DocumentKind;

/// Extracts the text of every page, in page order, joined by newlines.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        ExtractionError::Unreadable {
            kind: DocumentKind::Pdf,
            reason: e.to_string(),
        }
    })?;
    Ok(join_pages(pages))
}

fn join_pages(pages: Vec<String>) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a minimal, well-formed PDF with one Helvetica text line per page.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let page_count = pages.len();
        let font_id = 3 + 2 * page_count;
        let mut objects: Vec<String> = Vec::new();

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", 3 + 2 * i))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push(format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>"));
        for (i, text) in pages.iter().enumerate() {
            let content_id = 4 + 2 * i;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {content_id} 0 R >>"
            ));
            let stream = format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }

    #[test]
    fn test_pages_concatenated_in_order() {
        let pdf = build_pdf(&["AlphaPage", "BravoPage", "CharliePage"]);
        let text = extract_pdf_text(&pdf).unwrap();

        let alpha = text.find("AlphaPage").expect("page 1 text");
        let bravo = text.find("BravoPage").expect("page 2 text");
        let charlie = text.find("CharliePage").expect("page 3 text");
        assert!(alpha < bravo && bravo < charlie);
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_join_pages_separates_and_trims() {
        let joined = join_pages(vec![
            "  first page \n".to_string(),
            "second".to_string(),
            "   ".to_string(),
        ]);
        assert_eq!(joined, "first page\nsecond");
    }
}
