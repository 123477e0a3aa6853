//! MENU / MENUEX grammar (`spec.md` §4.3/§4.5).

use crate::ast::{CommonAttrs, MenuItem, TopLevel};
use crate::error::{CompileError, Result};
use crate::lexer::LexMode;
use crate::nameord::NameOrOrdinal;
use crate::numbers::Number;
use crate::token::{Span, TokenKind};

use super::{Parser, MAX_MENU_DEPTH};

const MF_GRAYED: u16 = 0x0001;
const MF_DISABLED: u16 = 0x0002;
const MF_CHECKED: u16 = 0x0008;
const MF_POPUP: u16 = 0x0010;
const MF_MENUBARBREAK: u16 = 0x0020;
const MF_MENUBREAK: u16 = 0x0040;
const MF_HELP: u16 = 0x4000;

fn classic_menu_flag(word: &str) -> Option<u16> {
    Some(match word {
        "GRAYED" => MF_GRAYED,
        "DISABLED" => MF_DISABLED,
        "CHECKED" => MF_CHECKED,
        "MENUBARBREAK" => MF_MENUBARBREAK,
        "MENUBREAK" => MF_MENUBREAK,
        "HELP" => MF_HELP,
        "INACTIVE" => MF_DISABLED,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub(super) fn parse_menu(&mut self, id: NameOrOrdinal, attrs: CommonAttrs, is_ex: bool, span: Span) -> Result<TopLevel> {
        self.expect_open_brace()?;
        let items = self.parse_menu_items(is_ex, 0)?;
        Ok(TopLevel::Menu { id, attrs, is_ex, items, span })
    }

    fn parse_menu_items(&mut self, is_ex: bool, depth: usize) -> Result<Vec<MenuItem>> {
        if depth > MAX_MENU_DEPTH {
            return Err(CompileError::NestingTooDeep("MENU item", MAX_MENU_DEPTH));
        }
        let mut items = Vec::new();
        loop {
            let before = self.lexer.pos();
            let tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
            if self.is_close_brace(tok) {
                break;
            }
            if tok.kind == TokenKind::Eof {
                return Err(CompileError::UnexpectedEof);
            }
            let word = tok.text(self.source).to_ascii_uppercase();
            match word.as_slice() {
                b"MENUITEM" => {
                    let before2 = self.lexer.pos();
                    let sep_tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
                    if sep_tok.text(self.source).eq_ignore_ascii_case(b"SEPARATOR") {
                        items.push(MenuItem::Separator);
                        continue;
                    }
                    self.lexer.restore(before2);
                    let text_tok = self.lexer.next(LexMode::Normal);
                    let text = self.string_value(text_tok)?;
                    let mut id = Number::new(0, false);
                    let mut menu_type = 0u32;
                    let mut state = 0u32;
                    let mut flags = 0u16;
                    let help_id = None;
                    if self.try_comma() {
                        id = self.parse_number_expr(false)?;
                        if is_ex {
                            if self.try_comma() {
                                menu_type = self.parse_number_expr(false)?.value;
                            }
                            if self.try_comma() {
                                state = self.parse_number_expr(false)?.value;
                            }
                        } else {
                            while self.try_comma() {
                                let flag_tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
                                let flag_word = String::from_utf8_lossy(flag_tok.text(self.source)).to_ascii_uppercase();
                                match classic_menu_flag(&flag_word) {
                                    Some(bit) => flags |= bit,
                                    None => return Err(CompileError::Malformed(format!("unknown menu item flag {flag_word:?}"))),
                                }
                            }
                        }
                    }
                    items.push(MenuItem::Item { text, id, flags, menu_type, state, help_id });
                }
                b"POPUP" => {
                    let text_tok = self.lexer.next(LexMode::Normal);
                    let text = self.string_value(text_tok)?;
                    let mut flags = MF_POPUP;
                    let mut id = Number::new(0, false);
                    let mut menu_type = 0u32;
                    let mut state = 0u32;
                    let mut help_id = None;
                    if is_ex {
                        if self.try_comma() {
                            id = self.parse_number_expr(false)?;
                            if self.try_comma() {
                                menu_type = self.parse_number_expr(false)?.value;
                            }
                            if self.try_comma() {
                                state = self.parse_number_expr(false)?.value;
                            }
                            if self.try_comma() {
                                help_id = Some(self.parse_number_expr(false)?.value);
                            }
                        }
                    } else {
                        while self.try_comma() {
                            let flag_tok = self.lexer.next(LexMode::WhitespaceDelimiterOnly);
                            let flag_word = String::from_utf8_lossy(flag_tok.text(self.source)).to_ascii_uppercase();
                            match classic_menu_flag(&flag_word) {
                                Some(bit) => flags |= bit,
                                None => return Err(CompileError::Malformed(format!("unknown menu item flag {flag_word:?}"))),
                            }
                        }
                    }
                    self.expect_open_brace()?;
                    let children = self.parse_menu_items(is_ex, depth + 1)?;
                    if children.is_empty() {
                        return Err(CompileError::Malformed(format!("empty menu popup {:?}", text.to_lossy_string())));
                    }
                    items.push(MenuItem::Popup { text, id, flags, menu_type, state, help_id, children });
                }
                _ => return Err(CompileError::ExpectedToken("MENUITEM or POPUP".to_string(), tok.span)),
            }
        }
        Ok(items)
    }
}
