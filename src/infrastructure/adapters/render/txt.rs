//! TXT 渲染（UTF-8）

use super::{Book, Section};

pub(crate) fn render(book: &Book) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&book.title);
    out.push('\n');
    for line in &book.introduction {
        out.push_str(line);
        out.push('\n');
    }

    for section in &book.sections {
        match section {
            Section::Volume(title) => {
                out.push_str("\n\n");
                out.push_str(title);
                out.push('\n');
            }
            Section::Chapter { title, paragraphs } => {
                out.push_str("\n\n");
                out.push_str(title);
                out.push_str("\n\n");
                for paragraph in paragraphs {
                    out.push_str(paragraph);
                    out.push('\n');
                }
            }
        }
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::super::{layout, tests::sample};
    use super::*;
    use crate::domain::FileLang;

    #[test]
    fn test_render_txt() {
        let (novel, chapters) = sample();
        let text = String::from_utf8(render(&layout(&novel, &chapters, FileLang::Jp))).unwrap();
        assert!(text.starts_with("異世界\nあらすじ\n"));
        assert!(text.contains("\n\n第一話\n\n一\n二\n"));
        assert!(!text.contains("第三話"));
    }
}
