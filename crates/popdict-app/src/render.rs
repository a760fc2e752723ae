use std::fmt::Write;

use popdict_core::view::{DefinitionBlock, DefinitionLanguage, EntryView, View};
use popdict_types::SavedState;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Plain-text rendering of popover views
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    ansi: bool,
}

impl Renderer {
    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    pub fn view(&self, view: &View) -> String {
        match view {
            View::Loading => "查询中...".to_string(),
            View::AuthError { login_url } => {
                format!("请求失败，请登录后刷新本页面\n去登录: {login_url}")
            }
            View::NotFound => "未查询到单词".to_string(),
            View::GenericError => "请求失败，请稍后重试".to_string(),
            View::Entry(entry) => self.entry(entry),
        }
    }

    pub fn favorite_changed(&self, state: SavedState) -> String {
        match state {
            SavedState::Saved => "操作成功: 已添加到生词本".to_string(),
            _ => "操作成功: 已从生词本移除".to_string(),
        }
    }

    fn entry(&self, entry: &EntryView) -> String {
        let mut out = String::new();

        let header = &entry.header;
        out.push_str(&self.bold(&header.word));
        if let Some(favorite) = &header.favorite {
            // ★ saved, ☆ not saved; toggled with :fav
            out.push_str(if favorite.active { "  ★" } else { "  ☆" });
        }
        if let Some(url) = &header.detail_url {
            let _ = write!(out, "\n查看详情: {url}");
        }

        if !entry.pronunciations.is_empty() {
            out.push('\n');
            for row in &entry.pronunciations {
                let _ = write!(out, "\n{}: /{}/  [:play {}]", row.region.label(), row.ipa, row.region.label());
            }
        }

        for block in &entry.definitions {
            out.push_str("\n\n");
            self.definitions(&mut out, block);
        }

        if let Some(examples) = &entry.examples {
            let _ = write!(out, "\n\n{}", self.bold("例句"));
            for line in examples {
                let _ = write!(out, "\n{}. {}", line.number, self.markup(&line.text_en));
                if line.audio_url.is_some() {
                    let _ = write!(out, "  [:play {}]", line.number);
                }
                let _ = write!(out, "\n   {}", line.text_cn);
            }
        }

        if entry.example_trigger {
            out.push_str("\n\n[:ex 查看例句]");
        }

        out
    }

    fn definitions(&self, out: &mut String, block: &DefinitionBlock) {
        let title = match block.language {
            DefinitionLanguage::Chinese => "中文",
            DefinitionLanguage::English => "英文",
        };
        out.push_str(&self.bold(title));

        for definition in &block.items {
            let _ = write!(out, "\n  {} {}", definition.part_of_speech, definition.text);
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.ansi {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Example text carries `<b>` emphasis around the looked-up word
    fn markup(&self, text: &str) -> String {
        let (open, close) = if self.ansi { (BOLD, RESET) } else { ("*", "*") };
        text.replace("<b>", open).replace("</b>", close)
    }
}

#[cfg(test)]
mod tests {
    use popdict_core::view::{ExampleLine, FavoriteControl, Header, PronunciationRow};
    use popdict_types::{Definition, Region};

    use super::*;

    fn apple() -> EntryView {
        EntryView {
            header: Header {
                word: "apple".into(),
                detail_url: Some("https://example.test/detail/42".into()),
                favorite: Some(FavoriteControl { active: false }),
            },
            pronunciations: vec![PronunciationRow {
                region: Region::Us,
                ipa: "ˈæpl".into(),
                audio_url: "u2".into(),
            }],
            definitions: vec![DefinitionBlock {
                language: DefinitionLanguage::Chinese,
                items: vec![Definition {
                    source_id: "d1".into(),
                    part_of_speech: "n.".into(),
                    text: "苹果".into(),
                }],
            }],
            examples: None,
            example_trigger: true,
        }
    }

    #[test]
    fn renders_status_views_with_copy() {
        let renderer = Renderer::new(false);

        assert_eq!(renderer.view(&View::Loading), "查询中...");
        assert_eq!(renderer.view(&View::NotFound), "未查询到单词");
        let auth = renderer.view(&View::AuthError {
            login_url: "https://example.test/login".into(),
        });
        assert!(auth.starts_with("请求失败，请登录后刷新本页面"));
        assert!(auth.contains("去登录: https://example.test/login"));
        assert!(!renderer.view(&View::GenericError).contains("去登录"));
    }

    #[test]
    fn renders_entry() {
        let text = Renderer::new(false).view(&View::Entry(apple()));

        assert_eq!(
            text,
            "apple  ☆\n查看详情: https://example.test/detail/42\n\nus: /ˈæpl/  [:play us]\n\n中文\n  n. 苹果\n\n[:ex 查看例句]"
        );
    }

    #[test]
    fn renders_examples_with_emphasis() {
        let mut entry = apple();
        entry.header.favorite = Some(FavoriteControl { active: true });
        entry.example_trigger = false;
        entry.examples = Some(vec![ExampleLine {
            number: 1,
            text_en: "An <b>apple</b> a day.".into(),
            text_cn: "一天一苹果。".into(),
            audio_url: Some("e1".into()),
        }]);

        let text = Renderer::new(false).view(&View::Entry(entry));

        assert!(text.starts_with("apple  ★"));
        assert!(text.ends_with("例句\n1. An *apple* a day.  [:play 1]\n   一天一苹果。"));

        let ansi = Renderer::new(true).markup("<b>x</b>");
        assert_eq!(ansi, "\x1b[1mx\x1b[0m");
    }

    #[test]
    fn renders_favorite_changes() {
        let renderer = Renderer::new(false);

        assert_eq!(
            renderer.favorite_changed(SavedState::Saved),
            "操作成功: 已添加到生词本"
        );
        assert_eq!(
            renderer.favorite_changed(SavedState::NotSaved),
            "操作成功: 已从生词本移除"
        );
    }
}
