/// Line-break marker emitted in place of `\n`.
pub const LINE_BREAK: &str = "<br>";

/// Prepares accumulated answer text for display.
///
/// Strips markdown bold (`**x**`) and italic (`*x*`) markers, drops any
/// stray asterisk and turns every newline into [`LINE_BREAK`]. Both markers
/// are made of asterisks, so the three stripping steps reduce to removing
/// every `*`. The output holds no `*` and no `\n`, which keeps the function
/// idempotent when it is re-applied to the whole accumulator on every chunk.
pub fn format_text(text: &str) -> String {
    let mut formatted = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '*' => {}
            '\n' => formatted.push_str(LINE_BREAK),
            other => formatted.push(other),
        }
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "texte simple",
        "**Article 3** : *alinéa 2*",
        "***gras italique***",
        "un * seul",
        "**non fermé",
        "ligne 1\nligne 2\n\n",
        "* puce 1\n* puce 2",
        "déjà<br>formaté",
        "**multi\nligne**",
    ];

    #[test]
    fn strips_bold_and_italic_markers() {
        assert_eq!(
            format_text("**Article 3** : *alinéa 2*"),
            "Article 3 : alinéa 2"
        );
        assert_eq!(format_text("***gras italique***"), "gras italique");
    }

    #[test]
    fn removes_stray_asterisks() {
        assert_eq!(format_text("un * seul"), "un  seul");
        assert_eq!(format_text("**non fermé"), "non fermé");
    }

    #[test]
    fn newlines_become_line_breaks() {
        assert_eq!(
            format_text("ligne 1\nligne 2\n"),
            "ligne 1<br>ligne 2<br>"
        );
        assert_eq!(format_text("**multi\nligne**"), "multi<br>ligne");
    }

    #[test]
    fn output_never_contains_asterisks_or_newlines() {
        for sample in SAMPLES {
            let formatted = format_text(sample);
            assert!(!formatted.contains('*'), "{sample:?} -> {formatted:?}");
            assert!(!formatted.contains('\n'), "{sample:?} -> {formatted:?}");
            assert_eq!(
                formatted.matches(LINE_BREAK).count(),
                sample.matches('\n').count() + sample.matches(LINE_BREAK).count()
            );
        }
    }

    #[test]
    fn formatting_is_idempotent() {
        for sample in SAMPLES {
            let once = format_text(sample);
            assert_eq!(format_text(&once), once, "{sample:?}");
        }
    }

    #[test]
    fn server_markup_passes_through() {
        let answer = "Voici le document demandé : \
                      <a href='/static/pdfs/loi-2020-12.pdf' target='_blank'>cliquer ici</a><br>\
                      Souhaitez-vous un résumé ? (oui/non)";
        assert_eq!(format_text(answer), answer);
    }
}
