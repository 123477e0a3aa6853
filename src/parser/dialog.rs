//! DIALOG / DIALOGEX grammar (`spec.md` §4.3/§4.5/§6).

use crate::ast::{CommonAttrs, DialogControl, DialogFont, DialogResource, TopLevel};
use crate::diagnostics::Reason;
use crate::error::{CompileError, Result};
use crate::lexer::LexMode;
use crate::nameord::NameOrOrdinal;
use crate::numbers::Number;
use crate::token::{Span, TokenKind};

use super::{Parser, MAX_CONTROLS};

/// Predefined control class ordinals (`spec.md` §4.5).
const BUTTON: u16 = 0x80;
const EDIT: u16 = 0x81;
const STATIC: u16 = 0x82;
const LISTBOX: u16 = 0x83;
const SCROLLBAR: u16 = 0x84;
const COMBOBOX: u16 = 0x85;

const WS_CHILD: u32 = 0x4000_0000;
const WS_VISIBLE: u32 = 0x1000_0000;
const DS_SETFONT: u32 = 0x40;

/// `(class ordinal, has leading text/caption parameter, extra implicit style bits)`.
fn control_keyword_info(keyword: &str) -> Option<(u16, bool, u32)> {
    Some(match keyword {
        "AUTO3STATE" | "AUTOCHECKBOX" | "AUTORADIOBUTTON" | "CHECKBOX" | "PUSHBOX" | "PUSHBUTTON" | "RADIOBUTTON"
        | "STATE3" | "USERBUTTON" | "DEFPUSHBUTTON" | "GROUPBOX" => (BUTTON, true, 0),
        "EDITTEXT" | "BEDIT" | "HEDIT" | "IEDIT" => (EDIT, false, 0),
        "LTEXT" | "RTEXT" | "CTEXT" => (STATIC, true, 0),
        "ICON" => (STATIC, true, 0),
        "LISTBOX" => (LISTBOX, false, 0),
        "SCROLLBAR" => (SCROLLBAR, false, 0),
        "COMBOBOX" => (COMBOBOX, false, 0),
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub(super) fn parse_dialog(
        &mut self,
        id: NameOrOrdinal,
        mut attrs: CommonAttrs,
        is_ex: bool,
        span: Span,
    ) -> Result<TopLevel> {
        let x = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let y = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let width = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let height = self.parse_number_expr(false)?;

        let mut help_id = None;
        if is_ex && self.try_comma() {
            help_id = Some(self.parse_number_expr(false)?);
        }

        let mut style = Number::new(0, false);
        let mut exstyle = Number::new(0, false);
        let mut caption = None;
        let mut class = None;
        let mut menu = None;
        let mut font = None;
        let mut class_or_menu_is_ordinal = false;

        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            if tok.kind != TokenKind::Literal {
                self.lexer.restore(before);
                break;
            }
            let word = tok.text(self.source).to_ascii_uppercase();
            match word.as_slice() {
                b"CAPTION" => {
                    let tok = self.lexer.next(LexMode::Normal);
                    caption = Some(self.string_value(tok)?);
                }
                b"CLASS" => {
                    let value = self.parse_name_or_ordinal_value_sticky(class_or_menu_is_ordinal)?;
                    class_or_menu_is_ordinal |= value.is_ordinal();
                    class = Some(value);
                }
                b"MENU" => {
                    let value = self.parse_name_or_ordinal_value_sticky(class_or_menu_is_ordinal)?;
                    class_or_menu_is_ordinal |= value.is_ordinal();
                    menu = Some(value);
                }
                b"STYLE" => style = self.parse_number_expr(true)?,
                b"EXSTYLE" => exstyle = self.parse_number_expr(true)?,
                b"FONT" => font = Some(self.parse_dialog_font(is_ex)?),
                b"LANGUAGE" => {
                    let (p, s) = self.parse_language_params()?;
                    attrs.language = Some((p, s));
                }
                b"CHARACTERISTICS" => attrs.characteristics = Some(self.parse_number_expr(false)?),
                b"VERSION" => attrs.version = Some(self.parse_number_expr(false)?),
                _ => {
                    self.lexer.restore(before);
                    break;
                }
            }
        }

        if font.is_some() {
            style = style.or(Number::new(DS_SETFONT, false));
        }

        self.expect_open_brace()?;
        let controls = self.parse_dialog_controls(is_ex)?;

        Ok(TopLevel::Dialog(DialogResource {
            id,
            attrs,
            is_ex,
            help_id,
            x,
            y,
            width,
            height,
            style,
            exstyle,
            caption,
            class,
            menu,
            font,
            controls,
            span,
        }))
    }

    fn parse_dialog_font(&mut self, is_ex: bool) -> Result<DialogFont> {
        let point_size = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let typeface_tok = self.lexer.next(LexMode::Normal);
        if !matches!(typeface_tok.kind, TokenKind::QuotedAsciiString | TokenKind::QuotedWideString) {
            return Err(CompileError::ExpectedToken("a quoted typeface name".to_string(), typeface_tok.span));
        }
        let typeface = self.string_value(typeface_tok)?;

        let mut weight = None;
        let mut italic = None;
        let mut charset = None;
        if is_ex {
            if self.try_comma() {
                weight = Some(self.parse_number_expr(false)?);
            }
            if self.try_comma() {
                italic = Some(self.parse_number_expr(false)?.value != 0);
            }
            if self.try_comma() {
                charset = Some(self.parse_number_expr(false)?);
            }
        }
        Ok(DialogFont { point_size, typeface, weight, italic, charset })
    }

    fn parse_dialog_controls(&mut self, is_ex: bool) -> Result<Vec<DialogControl>> {
        let mut controls = Vec::new();
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            if self.is_close_brace(tok) {
                break;
            }
            if tok.kind == TokenKind::Eof {
                return Err(CompileError::UnexpectedEof);
            }
            self.lexer.restore(before);
            let keyword_tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            let keyword = String::from_utf8_lossy(keyword_tok.text(self.source)).to_ascii_uppercase();
            let control = self.parse_one_control(&keyword, keyword_tok.span, is_ex)?;
            if controls.len() >= MAX_CONTROLS {
                return Err(CompileError::TooManyControls(MAX_CONTROLS));
            }
            controls.push(control);
        }
        Ok(controls)
    }

    fn parse_one_control(&mut self, keyword: &str, start_span: Span, is_ex: bool) -> Result<DialogControl> {
        if keyword == "CONTROL" {
            let text = Some(self.parse_name_or_ordinal_value()?);
            self.expect_comma()?;
            let id = self.parse_number_expr(false)?;
            self.expect_comma()?;
            let class = self.parse_name_or_ordinal_value()?;
            self.expect_comma()?;
            let style = self.parse_number_expr(true)?;
            self.expect_comma()?;
            let x = self.parse_number_expr(false)?;
            self.expect_comma()?;
            let y = self.parse_number_expr(false)?;
            self.expect_comma()?;
            let width = self.parse_number_expr(false)?;
            self.expect_comma()?;
            let height = self.parse_number_expr(false)?;

            let mut exstyle = Number::new(0, false);
            let mut help_id = None;
            let missing_trailing_comma = !self.try_comma();
            if !missing_trailing_comma {
                exstyle = self.parse_number_expr(true)?;
                if is_ex && self.try_comma() {
                    help_id = Some(self.parse_number_expr(false)?);
                }
            } else {
                self.diagnostics.warn(start_span, Reason::StyleMiscompileNoTrailingComma);
            }
            let extra_data = self.parse_control_extra_data()?;
            let span = start_span;
            return Ok(DialogControl {
                control_keyword: "CONTROL".to_string(),
                text,
                id,
                class,
                x,
                y,
                width,
                height,
                style,
                exstyle,
                help_id,
                extra_data,
                span,
                missing_trailing_comma,
            });
        }

        let Some((class_ordinal, has_text, extra_style)) = control_keyword_info(keyword) else {
            return Err(CompileError::Malformed(format!("unknown dialog control keyword {keyword:?}")));
        };

        let text = if has_text {
            let t = Some(self.parse_name_or_ordinal_value()?);
            self.expect_comma()?;
            t
        } else {
            None
        };
        let id = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let x = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let y = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let width = self.parse_number_expr(false)?;
        self.expect_comma()?;
        let height = self.parse_number_expr(false)?;

        let implicit_style = WS_CHILD | WS_VISIBLE | extra_style;
        let mut style = Number::new(implicit_style, false);
        let mut exstyle = Number::new(0, false);
        let mut help_id = None;
        let mut missing_trailing_comma = false;
        if self.try_comma() {
            style = self.parse_number_expr(true)?.or(Number::new(implicit_style, false));
            if self.try_comma() {
                exstyle = self.parse_number_expr(true)?;
                if is_ex && self.try_comma() {
                    help_id = Some(self.parse_number_expr(false)?);
                }
            }
        } else {
            missing_trailing_comma = true;
        }
        let extra_data = self.parse_control_extra_data()?;

        Ok(DialogControl {
            control_keyword: keyword.to_string(),
            text,
            id,
            class: NameOrOrdinal::Ordinal(class_ordinal),
            x,
            y,
            width,
            height,
            style,
            exstyle,
            help_id,
            extra_data,
            span: start_span,
            missing_trailing_comma,
        })
    }

    fn parse_control_extra_data(&mut self) -> Result<Vec<crate::ast::RawDataItem>> {
        let before = self.lexer.pos();
        let tok = self.lexer.next(LexMode::Normal);
        if self.is_open_brace(tok) {
            self.parse_raw_data_items()
        } else {
            self.lexer.restore(before);
            Ok(Vec::new())
        }
    }
}
