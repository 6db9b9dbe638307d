//! Novel File Renderer - EPUB / TXT 渲染
//!
//! 按目录顺序排版：卷标题单独成节，章节正文按语言选择原文、译文或对照。
//! 缺少译文或译文与原文段数不符的章节回退到原文，未缓存的章节被跳过。

mod epub;
mod txt;

use std::collections::HashMap;

use crate::application::ports::{NovelFileRendererPort, RenderError};
use crate::domain::chapter::Chapter;
use crate::domain::novel::Novel;
use crate::domain::{FileLang, FileType};

/// 排版后的书
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Book {
    pub identifier: String,
    pub language: &'static str,
    pub title: String,
    pub introduction: Vec<String>,
    pub sections: Vec<Section>,
    pub modified: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Section {
    Volume(String),
    Chapter { title: String, paragraphs: Vec<String> },
}

fn pick<'a>(lang: FileLang, src: &'a str, translated: Option<&'a str>) -> &'a str {
    match lang {
        FileLang::Jp => src,
        FileLang::Zh(_) | FileLang::Mix(_) => translated.unwrap_or(src),
    }
}

/// 译文段数与原文不一致（重新同步后原文变化）时视为没有译文
fn chapter_paragraphs(chapter: &Chapter, lang: FileLang) -> Vec<String> {
    let translated = lang
        .translator()
        .and_then(|t| chapter.translation(t))
        .map(|t| &t.paragraphs)
        .filter(|zh| zh.len() == chapter.paragraphs.len());

    match (lang, translated) {
        (FileLang::Zh(_), Some(zh)) => zh.clone(),
        (FileLang::Mix(_), Some(zh)) => chapter
            .paragraphs
            .iter()
            .zip(zh)
            .flat_map(|(jp, zh)| [jp.clone(), zh.clone()])
            .collect(),
        _ => chapter.paragraphs.clone(),
    }
}

pub(crate) fn layout(novel: &Novel, chapters: &[Chapter], lang: FileLang) -> Book {
    let by_id: HashMap<&str, &Chapter> = chapters
        .iter()
        .map(|chapter| (chapter.key.chapter_id(), chapter))
        .collect();

    let introduction_src = novel.introduction_src.as_str();
    let introduction = pick(lang, introduction_src, novel.introduction_translated.as_deref())
        .lines()
        .map(str::to_string)
        .collect();

    let sections = novel
        .toc
        .iter()
        .filter_map(|entry| {
            let title = pick(lang, &entry.title_src, entry.title_translated.as_deref()).to_string();
            match entry.chapter_id.as_deref() {
                None => Some(Section::Volume(title)),
                Some(id) => by_id.get(id).map(|chapter| Section::Chapter {
                    title,
                    paragraphs: chapter_paragraphs(chapter, lang),
                }),
            }
        })
        .collect();

    Book {
        identifier: format!("{}.{}", novel.key.provider_id(), novel.key.novel_id()),
        language: match lang {
            FileLang::Jp => "ja",
            FileLang::Zh(_) | FileLang::Mix(_) => "zh-CN",
        },
        title: pick(lang, &novel.title_src, novel.title_translated.as_deref()).to_string(),
        introduction,
        sections,
        modified: novel.change_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }
}

/// 默认渲染器
#[derive(Debug, Default, Clone)]
pub struct DefaultNovelFileRenderer;

impl DefaultNovelFileRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl NovelFileRendererPort for DefaultNovelFileRenderer {
    fn render(
        &self,
        novel: &Novel,
        chapters: &[Chapter],
        lang: FileLang,
        file_type: FileType,
    ) -> Result<Vec<u8>, RenderError> {
        let book = layout(novel, chapters, lang);
        let data = match file_type {
            FileType::Txt => txt::render(&book),
            FileType::Epub => epub::render(&book)?,
        };

        tracing::debug!(
            novel = %novel.key,
            lang = lang.as_str(),
            file_type = file_type.as_str(),
            sections = book.sections.len(),
            size = data.len(),
            "Novel file rendered"
        );
        Ok(data)
    }
}
