//! Statement parsing for the Nova language
//!
//! This module handles parsing of all statement types including:
//! - `have` declarations and plain assignments
//! - `put(...)` output
//! - `when`/`otherwise` and `while`
//! - bare blocks
//! - `window` declarations with their controls, handlers and icon

use crate::lexer::TokenType;
use crate::ast::*;
use super::parser::Parser;
use super::error::{ParseContext, ParseError, ParseResult};

impl Parser {
    /// Parse a statement
    pub fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let stmt = match &self.current_token().token_type {
            TokenType::Have => self.parse_var_declaration()?,
            TokenType::Put => self.parse_print_statement()?,
            TokenType::When => self.parse_if_statement()?,
            TokenType::While => self.parse_while_statement()?,
            TokenType::Window => Stmt::Window(self.parse_window_declaration()?),
            TokenType::LeftBrace => Stmt::Block(self.parse_block(ParseContext::Block)?),
            TokenType::Identifier(_) if *self.peek_type(1) == TokenType::Equal => {
                self.parse_assignment()?
            }
            _ if self.can_start_expression() => self.parse_expression_statement()?,
            _ => return Err(self.error_here("statement", ParseContext::Statement)),
        };

        // Terminators are optional
        self.match_token(&TokenType::Semicolon);
        Ok(stmt)
    }

    /// `have name = expr`
    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        let start_pos = self.expect(TokenType::Have, ParseContext::VariableDeclaration)?.position;
        let (name, _) = self.expect_identifier("variable name", ParseContext::VariableDeclaration)?;
        self.expect(TokenType::Equal, ParseContext::VariableDeclaration)?;
        let initializer = self.parse_expression()?;

        Ok(Stmt::VarDecl {
            name,
            initializer,
            binding: None,
            span: self.span_from(start_pos),
        })
    }

    /// `name = expr`
    fn parse_assignment(&mut self) -> ParseResult<Stmt> {
        let (name, start_pos) = self.expect_identifier("variable name", ParseContext::Assignment)?;
        self.expect(TokenType::Equal, ParseContext::Assignment)?;
        let value = self.parse_expression()?;

        Ok(Stmt::Assign {
            name,
            value,
            binding: None,
            span: self.span_from(start_pos),
        })
    }

    /// `put(expr)`
    fn parse_print_statement(&mut self) -> ParseResult<Stmt> {
        let start_pos = self.expect(TokenType::Put, ParseContext::PrintStatement)?.position;
        self.expect(TokenType::LeftParen, ParseContext::PrintStatement)?;
        let expr = self.parse_expression()?;
        self.expect(TokenType::RightParen, ParseContext::PrintStatement)?;

        Ok(Stmt::Print {
            expr,
            span: self.span_from(start_pos),
        })
    }

    /// `when (expr) block [otherwise block]`
    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        let start_pos = self.expect(TokenType::When, ParseContext::IfCondition)?.position;
        self.expect(TokenType::LeftParen, ParseContext::IfCondition)?;
        let condition = self.parse_expression()?;
        self.expect(TokenType::RightParen, ParseContext::IfCondition)?;
        let then_block = self.parse_block(ParseContext::Block)?;

        let else_block = if self.match_token(&TokenType::Otherwise) {
            Some(self.parse_block(ParseContext::Block)?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
            span: self.span_from(start_pos),
        })
    }

    /// `while (expr) block`
    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        let start_pos = self.expect(TokenType::While, ParseContext::WhileCondition)?.position;
        self.expect(TokenType::LeftParen, ParseContext::WhileCondition)?;
        let condition = self.parse_expression()?;
        self.expect(TokenType::RightParen, ParseContext::WhileCondition)?;
        let body = self.parse_block(ParseContext::Block)?;

        Ok(Stmt::While {
            condition,
            body,
            span: self.span_from(start_pos),
        })
    }

    /// A call evaluated for its side effect. Other expressions have no
    /// effect and are rejected here rather than by the target compiler.
    fn parse_expression_statement(&mut self) -> ParseResult<Stmt> {
        let start_pos = self.current_position();
        let expr = self.parse_expression()?;
        if !matches!(expr, Expr::Call { .. }) {
            return Err(ParseError::invalid_syntax(
                "only calls can be used as statements",
                start_pos,
            ));
        }

        Ok(Stmt::Expression {
            expr,
            span: self.span_from(start_pos),
        })
    }

    /// `{ statement* }` with per-statement error recovery
    pub fn parse_block(&mut self, context: ParseContext) -> ParseResult<Block> {
        let start_pos = self.expect(TokenType::LeftBrace, context)?.position;
        let mut statements = Vec::new();

        while !self.check(&TokenType::RightBrace) && !self.is_at_end() {
            let start = self.position_index();
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => self.recover(err, start),
            }
        }

        self.expect(TokenType::RightBrace, ParseContext::Block)?;
        Ok(Block {
            statements,
            span: self.span_from(start_pos),
        })
    }

    /// `window name { (property | control | set_icon)* }`
    fn parse_window_declaration(&mut self) -> ParseResult<WindowDecl> {
        let context = ParseContext::WindowDeclaration;
        let start_pos = self.expect(TokenType::Window, context)?.position;
        let (name, _) = self.expect_identifier("window name", context)?;
        self.expect(TokenType::LeftBrace, context)?;

        let mut window = WindowDecl {
            name,
            properties: Vec::new(),
            controls: Vec::new(),
            icons: Vec::new(),
            icon: None,
            captures: Vec::new(),
            span: Span::single(start_pos),
        };

        while !self.check(&TokenType::RightBrace) && !self.is_at_end() {
            let start = self.position_index();
            let item = match (self.peek_type(0), self.peek_type(1)) {
                (TokenType::SetIcon, _) => self.parse_icon_declaration().map(|icon| window.icons.push(icon)),
                (TokenType::Identifier(_), TokenType::Equal) => {
                    self.parse_property(context).map(|prop| window.properties.push(prop))
                }
                (TokenType::Identifier(_), TokenType::Identifier(_)) => {
                    self.parse_control_declaration().map(|control| window.controls.push(control))
                }
                _ => Err(self.error_here("control, property or `set_icon`", context)),
            };
            match item {
                Ok(()) => {
                    self.match_token(&TokenType::Semicolon);
                }
                Err(err) => self.recover(err, start),
            }
        }

        self.expect(TokenType::RightBrace, context)?;
        window.span = self.span_from(start_pos);
        Ok(window)
    }

    /// `set_icon(expr)`
    fn parse_icon_declaration(&mut self) -> ParseResult<IconDecl> {
        let context = ParseContext::IconDeclaration;
        let start_pos = self.expect(TokenType::SetIcon, context)?.position;
        self.expect(TokenType::LeftParen, context)?;
        let path = self.parse_expression()?;
        self.expect(TokenType::RightParen, context)?;

        Ok(IconDecl {
            path,
            span: self.span_from(start_pos),
        })
    }

    /// `name = expr` inside a window or control body
    fn parse_property(&mut self, context: ParseContext) -> ParseResult<Property> {
        let (name, start_pos) = self.expect_identifier("property name", context)?;
        self.expect(TokenType::Equal, context)?;
        let value = self.parse_expression()?;

        Ok(Property {
            name,
            value,
            span: self.span_from(start_pos),
        })
    }

    /// `kind name { (property | event block)* }`
    fn parse_control_declaration(&mut self) -> ParseResult<ControlDecl> {
        let context = ParseContext::ControlDeclaration;
        let (kind_tag, start_pos) = self.expect_identifier("control kind", context)?;
        let (name, _) = self.expect_identifier("control name", context)?;
        self.expect(TokenType::LeftBrace, context)?;

        let mut properties = Vec::new();
        let mut handlers = Vec::new();

        while !self.check(&TokenType::RightBrace) && !self.is_at_end() {
            let start = self.position_index();
            let item = match (self.peek_type(0), self.peek_type(1)) {
                (TokenType::Identifier(_), TokenType::Equal) => {
                    self.parse_property(context).map(|prop| properties.push(prop))
                }
                (TokenType::Identifier(_), TokenType::LeftBrace) => {
                    self.parse_event_handler(context).map(|handler| handlers.push(handler))
                }
                _ => Err(self.error_here("property or event handler", context)),
            };
            match item {
                Ok(()) => {
                    self.match_token(&TokenType::Semicolon);
                }
                Err(err) => self.recover(err, start),
            }
        }

        self.expect(TokenType::RightBrace, context)?;
        Ok(ControlDecl {
            kind_tag,
            kind: None,
            name,
            properties,
            handlers,
            span: self.span_from(start_pos),
        })
    }

    /// `on_event { statement* }`
    fn parse_event_handler(&mut self, context: ParseContext) -> ParseResult<EventHandler> {
        let (event, event_pos) = self.expect_identifier("event name", context)?;
        let body = self.parse_block(ParseContext::Block)?;
        Ok(EventHandler {
            event,
            body,
            span: self.span_from(event_pos),
        })
    }
}
