//! 表达式解析模块
//!
//! 负责解析各种表达式，包括算术表达式、逻辑表达式、函数调用、子查询等。

use crate::core::{LogicalType, Value};
use crate::query::parser::ast::*;
use crate::query::parser::core::error::ParseError;
use crate::query::parser::core::TokenKind;
use crate::query::parser::parser::parse_context::ParseContext;
use crate::query::parser::parser::query_parser::QueryParser;

/// 一层表达式嵌套经过的优先级函数数目，从 OR 到 primary
pub const EXPRESSION_NESTING_COST: usize = 10;

pub struct ExprParser;

impl ExprParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        ctx.enter_recursion_by(EXPRESSION_NESTING_COST)?;
        let result = self.parse_or_expression(ctx);
        ctx.exit_recursion_by(EXPRESSION_NESTING_COST);
        result
    }

    /// 逗号分隔的表达式列表
    pub fn parse_expression_list(&mut self, ctx: &mut ParseContext) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expression(ctx)?];
        while ctx.match_token(TokenKind::Comma) {
            exprs.push(self.parse_expression(ctx)?);
        }
        Ok(exprs)
    }

    /// 类型名，如 `VARCHAR`、`DECIMAL(10, 2)`
    pub fn parse_type_name(&mut self, ctx: &mut ParseContext) -> Result<LogicalType, ParseError> {
        let name = ctx.expect_identifier()?;
        if ctx.match_token(TokenKind::LParen) {
            loop {
                match ctx.current_token().kind {
                    TokenKind::IntegerLiteral(_) => {
                        ctx.next_token();
                    }
                    _ => return Err(ctx.unexpected(&["integer".to_string()])),
                }
                if !ctx.match_token(TokenKind::Comma) {
                    break;
                }
            }
            ctx.expect_token(TokenKind::RParen)?;
        }
        Ok(LogicalType::from_name(&name))
    }

    fn parse_or_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let mut left = self.parse_and_expression(ctx)?;

        while ctx.match_token(TokenKind::Or) {
            let right = self.parse_and_expression(ctx)?;
            left = Expr::binary(left, BinaryOp::Or, right);
        }

        Ok(left)
    }

    fn parse_and_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let mut left = self.parse_not_expression(ctx)?;

        while ctx.match_token(TokenKind::And) {
            let right = self.parse_not_expression(ctx)?;
            left = Expr::binary(left, BinaryOp::And, right);
        }

        Ok(left)
    }

    fn parse_not_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        if ctx.match_token(TokenKind::Not) {
            ctx.enter_recursion()?;
            let operand = self.parse_not_expression(ctx);
            ctx.exit_recursion();
            Ok(Expr::Unary(UnaryExpr {
                op: UnaryOp::Not,
                operand: Box::new(operand?),
            }))
        } else {
            self.parse_predicate(ctx)
        }
    }

    fn parse_predicate(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let left = self.parse_concat_expression(ctx)?;

        if ctx.match_token(TokenKind::Is) {
            let negated = ctx.match_token(TokenKind::Not);
            ctx.expect_token(TokenKind::Null)?;
            return Ok(Expr::IsNull(IsNullExpr {
                expr: Box::new(left),
                negated,
            }));
        }

        let negated = if ctx.check_token(&TokenKind::Not)
            && matches!(
                ctx.peek_nth(1).kind,
                TokenKind::In | TokenKind::Like | TokenKind::Between
            ) {
            ctx.next_token();
            true
        } else {
            false
        };

        if ctx.match_token(TokenKind::In) {
            ctx.expect_token(TokenKind::LParen)?;
            let list = self.parse_expression_list(ctx)?;
            ctx.expect_token(TokenKind::RParen)?;
            return Ok(Expr::InList(InListExpr {
                expr: Box::new(left),
                list,
                negated,
            }));
        }

        if ctx.match_token(TokenKind::Like) {
            let right = self.parse_concat_expression(ctx)?;
            let op = if negated { BinaryOp::NotLike } else { BinaryOp::Like };
            return Ok(Expr::binary(left, op, right));
        }

        if ctx.match_token(TokenKind::Between) {
            let lower = self.parse_concat_expression(ctx)?;
            ctx.expect_token(TokenKind::And)?;
            let upper = self.parse_concat_expression(ctx)?;
            return Ok(Expr::Between(BetweenExpr {
                expr: Box::new(left),
                lower: Box::new(lower),
                upper: Box::new(upper),
                negated,
            }));
        }

        if let Some(op) = self.parse_comparison_op(ctx) {
            let right = self.parse_concat_expression(ctx)?;
            return Ok(Expr::binary(left, op, right));
        }

        Ok(left)
    }

    fn parse_comparison_op(&mut self, ctx: &mut ParseContext) -> Option<BinaryOp> {
        let op = match ctx.current_token().kind {
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            _ => return None,
        };
        ctx.next_token();
        Some(op)
    }

    fn parse_concat_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive_expression(ctx)?;

        while ctx.match_token(TokenKind::Concat) {
            let right = self.parse_additive_expression(ctx)?;
            left = Expr::binary(left, BinaryOp::Concat, right);
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative_expression(ctx)?;

        loop {
            let op = match ctx.current_token().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            ctx.next_token();
            let right = self.parse_multiplicative_expression(ctx)?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary_expression(ctx)?;

        loop {
            let op = match ctx.current_token().kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                TokenKind::Percent => BinaryOp::Modulo,
                _ => break,
            };
            ctx.next_token();
            let right = self.parse_unary_expression(ctx)?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        if ctx.match_token(TokenKind::Minus) {
            ctx.enter_recursion()?;
            let operand = self.parse_unary_expression(ctx);
            ctx.exit_recursion();
            // 数字字面量直接取负
            return Ok(match operand? {
                Expr::Constant(Value::Integer(i)) => Expr::Constant(Value::from_integer_literal(-(i as i64))),
                Expr::Constant(Value::BigInt(i)) => Expr::Constant(Value::from_integer_literal(-i)),
                Expr::Constant(Value::Double(d)) => Expr::Constant(Value::Double(-d)),
                other => Expr::Unary(UnaryExpr {
                    op: UnaryOp::Negate,
                    operand: Box::new(other),
                }),
            });
        }
        if ctx.match_token(TokenKind::Plus) {
            return self.parse_unary_expression(ctx);
        }
        self.parse_postfix_expression(ctx)
    }

    fn parse_postfix_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expression(ctx)?;
        while ctx.match_token(TokenKind::DoubleColon) {
            let target = self.parse_type_name(ctx)?;
            expr = Expr::Cast(CastExpr {
                expr: Box::new(expr),
                target,
            });
        }
        Ok(expr)
    }

    fn parse_primary_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let token = ctx.current_token().clone();
        match token.kind {
            TokenKind::IntegerLiteral(i) => {
                ctx.next_token();
                Ok(Expr::Constant(Value::from_integer_literal(i)))
            }
            TokenKind::FloatLiteral(f) => {
                ctx.next_token();
                Ok(Expr::Constant(Value::Double(f)))
            }
            TokenKind::StringLiteral(s) => {
                ctx.next_token();
                Ok(Expr::Constant(Value::Varchar(s)))
            }
            TokenKind::Null => {
                ctx.next_token();
                Ok(Expr::Constant(Value::Null))
            }
            TokenKind::True => {
                ctx.next_token();
                Ok(Expr::Constant(Value::Boolean(true)))
            }
            TokenKind::False => {
                ctx.next_token();
                Ok(Expr::Constant(Value::Boolean(false)))
            }
            TokenKind::Star => {
                ctx.next_token();
                Ok(Expr::Star(StarExpr { relation_name: None }))
            }
            TokenKind::LParen => {
                if QueryParser::starts_query(ctx.peek_nth(1)) {
                    ctx.next_token();
                    let subquery = QueryParser::new().parse_select_statement(ctx)?;
                    ctx.expect_token(TokenKind::RParen)?;
                    return Ok(Expr::Subquery(SubqueryExpr {
                        kind: SubqueryKind::Scalar,
                        subquery: Box::new(subquery),
                    }));
                }
                ctx.next_token();
                let expr = self.parse_expression(ctx)?;
                ctx.expect_token(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Exists => {
                ctx.next_token();
                ctx.expect_token(TokenKind::LParen)?;
                let subquery = QueryParser::new().parse_select_statement(ctx)?;
                ctx.expect_token(TokenKind::RParen)?;
                Ok(Expr::Subquery(SubqueryExpr {
                    kind: SubqueryKind::Exists,
                    subquery: Box::new(subquery),
                }))
            }
            TokenKind::Case => self.parse_case_expression(ctx),
            TokenKind::Cast => {
                ctx.next_token();
                ctx.expect_token(TokenKind::LParen)?;
                let expr = self.parse_expression(ctx)?;
                ctx.expect_token(TokenKind::As)?;
                let target = self.parse_type_name(ctx)?;
                ctx.expect_token(TokenKind::RParen)?;
                Ok(Expr::Cast(CastExpr {
                    expr: Box::new(expr),
                    target,
                }))
            }
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) => {
                self.parse_identifier_expression(ctx)
            }
            _ => Err(ctx.unexpected(&["expression".to_string()])),
        }
    }

    /// 列引用 `a.b.c`、`t.*` 或函数调用 `[schema.]f(...)`
    fn parse_identifier_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        let mut names = vec![ctx.expect_identifier()?];

        loop {
            if ctx.check_token(&TokenKind::LParen) && names.len() <= 2 {
                let function_name = names.pop().unwrap_or_default();
                let schema = names.pop();
                let mut function = self.parse_function_arguments(ctx, function_name)?;
                function.schema = schema;
                return Ok(Expr::Function(function));
            }
            if !ctx.match_token(TokenKind::Dot) {
                break;
            }
            if ctx.match_token(TokenKind::Star) {
                return Ok(Expr::Star(StarExpr {
                    relation_name: names.pop(),
                }));
            }
            names.push(ctx.expect_identifier()?);
        }

        Ok(Expr::Column(ColumnRef { names }))
    }

    pub fn parse_function_arguments(
        &mut self,
        ctx: &mut ParseContext,
        function_name: String,
    ) -> Result<FunctionExpression, ParseError> {
        ctx.expect_token(TokenKind::LParen)?;
        let mut function = FunctionExpression::new(function_name, Vec::new());

        if ctx.match_token(TokenKind::RParen) {
            return Ok(function);
        }
        if ctx.check_token(&TokenKind::Star) && ctx.peek_nth(1).kind == TokenKind::RParen {
            ctx.next_token();
            ctx.next_token();
            function.children.push(Expr::Star(StarExpr { relation_name: None }));
            return Ok(function);
        }

        function.distinct = ctx.match_token(TokenKind::Distinct);
        ctx.enter_recursion()?;
        let children = self.parse_expression_list(ctx);
        ctx.exit_recursion();
        function.children = children?;
        ctx.expect_token(TokenKind::RParen)?;
        Ok(function)
    }

    fn parse_case_expression(&mut self, ctx: &mut ParseContext) -> Result<Expr, ParseError> {
        ctx.expect_token(TokenKind::Case)?;

        let operand = if ctx.check_token(&TokenKind::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(ctx)?))
        };

        let mut when_then = Vec::new();
        while ctx.match_token(TokenKind::When) {
            let when = self.parse_expression(ctx)?;
            ctx.expect_token(TokenKind::Then)?;
            let then = self.parse_expression(ctx)?;
            when_then.push((when, then));
        }
        if when_then.is_empty() {
            return Err(ctx.unexpected(&["WHEN".to_string()]));
        }

        let else_expr = if ctx.match_token(TokenKind::Else) {
            Some(Box::new(self.parse_expression(ctx)?))
        } else {
            None
        };
        ctx.expect_token(TokenKind::End)?;

        Ok(Expr::Case(CaseExpr {
            operand,
            when_then,
            else_expr,
        }))
    }
}

impl Default for ExprParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::lexer::Lexer;

    fn parse(input: &str) -> Expr {
        let tokens = Lexer::new(input).tokenize().expect("词法分析应该成功");
        let mut ctx = ParseContext::new(tokens);
        let expr = ExprParser::new()
            .parse_expression(&mut ctx)
            .expect("表达式解析应该成功");
        assert!(ctx.is_eof(), "表达式应该被完整消费");
        expr
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3 = 7 AND NOT a");
        match expr {
            Expr::Binary(BinaryExpr { op: BinaryOp::And, left, right }) => {
                assert!(matches!(*left, Expr::Binary(BinaryExpr { op: BinaryOp::Eq, .. })));
                assert!(matches!(*right, Expr::Unary(UnaryExpr { op: UnaryOp::Not, .. })));
            }
            other => panic!("期望 AND 表达式, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_negative_literal_is_folded() {
        assert_eq!(parse("-5"), Expr::Constant(Value::Integer(-5)));
    }

    #[test]
    fn test_qualified_column_and_star() {
        assert_eq!(parse("a.name"), Expr::column(&["a", "name"]));
        assert_eq!(
            parse("t.*"),
            Expr::Star(StarExpr {
                relation_name: Some("t".to_string())
            })
        );
    }

    #[test]
    fn test_function_call() {
        match parse("count(DISTINCT a.id)") {
            Expr::Function(f) => {
                assert_eq!(f.function_name, "count");
                assert!(f.distinct);
                assert_eq!(f.children.len(), 1);
            }
            other => panic!("期望函数调用, 实际 {:?}", other),
        }
        match parse("count(*)") {
            Expr::Function(f) => assert!(matches!(f.children[0], Expr::Star(_))),
            other => panic!("期望函数调用, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_predicates() {
        assert!(matches!(parse("a IS NOT NULL"), Expr::IsNull(IsNullExpr { negated: true, .. })));
        assert!(matches!(parse("a NOT IN (1, 2)"), Expr::InList(InListExpr { negated: true, .. })));
        assert!(matches!(parse("a BETWEEN 1 AND 3"), Expr::Between(_)));
        assert!(matches!(
            parse("name NOT LIKE 'x%'"),
            Expr::Binary(BinaryExpr { op: BinaryOp::NotLike, .. })
        ));
    }

    #[test]
    fn test_cast_forms() {
        assert!(matches!(parse("CAST(a AS VARCHAR)"), Expr::Cast(CastExpr { target: LogicalType::Varchar, .. })));
        assert!(matches!(parse("a::INTEGER"), Expr::Cast(CastExpr { target: LogicalType::Integer, .. })));
    }

    #[test]
    fn test_case_expression() {
        match parse("CASE WHEN a > 1 THEN 'big' ELSE 'small' END") {
            Expr::Case(case) => {
                assert!(case.operand.is_none());
                assert_eq!(case.when_then.len(), 1);
                assert!(case.else_expr.is_some());
            }
            other => panic!("期望 CASE 表达式, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_scalar_subquery() {
        assert!(matches!(
            parse("(SELECT 1)"),
            Expr::Subquery(SubqueryExpr { kind: SubqueryKind::Scalar, .. })
        ));
    }

    fn parse_with_default_limit(input: &str) -> Result<Expr, ParseError> {
        let tokens = Lexer::new(input).tokenize().expect("词法分析应该成功");
        let mut ctx = ParseContext::new(tokens);
        ExprParser::new().parse_expression(&mut ctx)
    }

    #[test]
    fn test_deep_nesting_hits_recursion_limit() {
        // 在栈耗尽之前报错，而不是让测试线程溢出
        for depth in [60, 200, 5000] {
            let input = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
            let err = parse_with_default_limit(&input).unwrap_err();
            assert_eq!(
                err.kind,
                crate::query::parser::core::ParseErrorKind::RecursionLimitExceeded
            );
        }
    }

    #[test]
    fn test_nested_function_calls_hit_recursion_limit() {
        let input = format!("{}1{}", "abs(".repeat(500), ")".repeat(500));
        let err = parse_with_default_limit(&input).unwrap_err();
        assert_eq!(
            err.kind,
            crate::query::parser::core::ParseErrorKind::RecursionLimitExceeded
        );
    }

    #[test]
    fn test_moderate_nesting_within_default_limit() {
        let input = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert!(parse_with_default_limit(&input).is_ok());

        let input = format!("{}x{}", "abs(".repeat(15), ")".repeat(15));
        assert!(parse_with_default_limit(&input).is_ok());
    }

    #[test]
    fn test_long_flat_expression_does_not_count_as_nesting() {
        let input = vec!["1"; 2000].join(" + ");
        assert!(parse_with_default_limit(&input).is_ok());
    }
}
