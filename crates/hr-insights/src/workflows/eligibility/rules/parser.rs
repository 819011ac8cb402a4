use super::ast::{Expr, Literal, Operand};
use super::lexer::{tokenize, Token, TokenKind};
use super::ParseError;

/// Recursive descent over the token stream. `&&` binds tighter than `||`.
pub(crate) fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, cursor: 0 };
    let expr = parser.or_expr()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(ParseError::new(
            trailing.offset,
            format!("unexpected {} after expression", trailing.kind),
        ));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.peek().kind == TokenKind::Or {
            self.advance();
            let right = self.and_expr()?;
            left = Expr::LogicalOr(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.primary()?;
        while self.peek().kind == TokenKind::And {
            self.advance();
            let right = self.primary()?;
            left = Expr::LogicalAnd(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.peek().kind == TokenKind::LParen {
            let open = self.advance();
            let inner = self.or_expr()?;
            let close = self.advance();
            if close.kind != TokenKind::RParen {
                return Err(ParseError::new(
                    close.offset,
                    format!(
                        "expected ')' to close '(' at offset {}, found {}",
                        open.offset, close.kind
                    ),
                ));
            }
            return Ok(inner);
        }

        let left = self.operand()?;
        if let TokenKind::Compare(op) = self.peek().kind {
            self.advance();
            let right = self.operand()?;
            return Ok(Expr::Comparison { left, op, right });
        }

        Ok(match left {
            Operand::Literal(literal) => Expr::Literal(literal),
            Operand::Variable(name) => Expr::Variable(name),
        })
    }

    fn operand(&mut self) -> Result<Operand, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(Operand::Variable(name)),
            TokenKind::Number(value) => Ok(Operand::Literal(Literal::Number(value))),
            TokenKind::Str(value) => Ok(Operand::Literal(Literal::Text(value))),
            TokenKind::Bool(value) => Ok(Operand::Literal(Literal::Bool(value))),
            other => Err(ParseError::new(
                token.offset,
                format!("expected a variable or literal, found {other}"),
            )),
        }
    }
}
