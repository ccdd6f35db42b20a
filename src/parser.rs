use crate::ast::{BinaryOp, ElseCase, IfCase, Node, TypeTag, UnaryOp};
use crate::error::XbError;
use crate::lexer::{Literal, Token, TokenType};
use crate::position::Span;
use crate::stack::ensure_sufficient_stack;
use crate::value::Number;
use std::rc::Rc;

const ATOM_EXPECTED: &str =
    "Expected int, float, string, identifier, '-', '(', '[', 'IF', 'FOR', 'WHILE' or 'FN'";

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let span = tokens.last().map(|t| t.span.clone()).unwrap_or_default();
            tokens.push(Token::new(TokenType::Eof, None, span));
        }
        Self { tokens, current: 0 }
    }

    /// Parse a whole program into its statement list. Fails on the first
    /// unexpected token.
    pub fn parse(&mut self) -> Result<Node, XbError> {
        let program = self.statements()?;

        if !self.is_at_end() {
            return Err(XbError::invalid_syntax(
                self.peek().span.clone(),
                "Token cannot appear after previous tokens".to_string(),
            ));
        }

        Ok(program)
    }

    fn statements(&mut self) -> Result<Node, XbError> {
        let first = self.peek().span.start.clone();
        let mut statements = Vec::new();

        loop {
            while self.match_types(&[TokenType::Newline]) {}
            if self.at_block_end() {
                break;
            }

            statements.push(self.statement()?);

            if !self.check(TokenType::Newline) {
                break;
            }
        }

        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => first.span().to(last.span()),
            _ => Span::new(first.clone(), first),
        };

        Ok(Node::List {
            elements: statements,
            span,
        })
    }

    fn at_block_end(&self) -> bool {
        matches!(
            self.peek().token_type,
            TokenType::End | TokenType::Else | TokenType::Elif | TokenType::Eof
        )
    }

    fn statement(&mut self) -> Result<Node, XbError> {
        let keyword = self.peek().clone();

        match keyword.token_type {
            TokenType::Return => {
                self.advance();
                let value = if self.starts_expression() {
                    Some(Box::new(self.expression()?))
                } else {
                    None
                };
                let span = match &value {
                    Some(value) => keyword.span.to(value.span()),
                    None => keyword.span,
                };
                Ok(Node::Return { value, span })
            }
            TokenType::Continue => {
                self.advance();
                Ok(Node::Continue { span: keyword.span })
            }
            TokenType::Break => {
                self.advance();
                Ok(Node::Break { span: keyword.span })
            }
            _ => self.expression(),
        }
    }

    fn starts_expression(&self) -> bool {
        use TokenType::*;
        matches!(
            self.peek().token_type,
            Int | Float
                | String
                | Identifier
                | LeftParen
                | LeftSquare
                | Minus
                | Not
                | If
                | For
                | While
                | Fn
                | Num
                | Text
                | List
        )
    }

    // Every nesting construct comes back through here.
    fn expression(&mut self) -> Result<Node, XbError> {
        ensure_sufficient_stack(|| self.declaration_or_logic())
    }

    fn declaration_or_logic(&mut self) -> Result<Node, XbError> {
        if self.peek().token_type.is_type_tag() {
            return self.declaration();
        }
        if self.check(TokenType::Identifier) && self.peek_next().token_type == TokenType::Colon {
            return self.annotated_declaration();
        }

        self.binary_op(
            Self::comparison,
            &[(TokenType::And, BinaryOp::And), (TokenType::Or, BinaryOp::Or)],
        )
    }

    // num x = <expr>
    fn declaration(&mut self) -> Result<Node, XbError> {
        let tag = self.advance();
        let dtype = type_tag(&tag)?;

        let name = self.consume_with_help(
            TokenType::Identifier,
            "Expected identifier",
            format!("Declarations name the variable after its type. Example: {} x = ...", dtype),
        )?;
        self.consume(TokenType::Eq, "Expected '='")?;
        let value = self.expression()?;

        Ok(Node::VarAssign {
            name: name.text().to_string(),
            span: tag.span.to(value.span()),
            value: Box::new(value),
            dtype,
        })
    }

    // x : num = <expr>
    fn annotated_declaration(&mut self) -> Result<Node, XbError> {
        let name = self.advance();
        self.advance();

        let tag = self.advance();
        let dtype = type_tag(&tag)?;
        self.consume(TokenType::Eq, "Expected '='")?;
        let value = self.expression()?;

        Ok(Node::VarAssign {
            name: name.text().to_string(),
            span: name.span.to(value.span()),
            value: Box::new(value),
            dtype,
        })
    }

    fn comparison(&mut self) -> Result<Node, XbError> {
        if self.check(TokenType::Not) {
            let operator = self.advance();
            let operand = ensure_sufficient_stack(|| self.comparison())?;
            return Ok(Node::UnaryOp {
                operator: UnaryOp::Not,
                span: operator.span.to(operand.span()),
                operand: Box::new(operand),
            });
        }

        self.binary_op(
            Self::arithmetic,
            &[
                (TokenType::EqEq, BinaryOp::Equal),
                (TokenType::NotEq, BinaryOp::NotEqual),
                (TokenType::Less, BinaryOp::Less),
                (TokenType::Greater, BinaryOp::Greater),
                (TokenType::LessEq, BinaryOp::LessEqual),
                (TokenType::GreaterEq, BinaryOp::GreaterEqual),
            ],
        )
    }

    fn arithmetic(&mut self) -> Result<Node, XbError> {
        self.binary_op(
            Self::term,
            &[
                (TokenType::Plus, BinaryOp::Add),
                (TokenType::Minus, BinaryOp::Subtract),
            ],
        )
    }

    fn term(&mut self) -> Result<Node, XbError> {
        self.binary_op(
            Self::factor,
            &[
                (TokenType::Mul, BinaryOp::Multiply),
                (TokenType::Div, BinaryOp::Divide),
            ],
        )
    }

    fn factor(&mut self) -> Result<Node, XbError> {
        if self.check(TokenType::Minus) {
            let operator = self.advance();
            let operand = ensure_sufficient_stack(|| self.factor())?;
            return Ok(Node::UnaryOp {
                operator: UnaryOp::Negate,
                span: operator.span.to(operand.span()),
                operand: Box::new(operand),
            });
        }

        self.power()
    }

    // The right operand goes back through `factor`, so `^` nests to the right.
    fn power(&mut self) -> Result<Node, XbError> {
        let mut left = self.call()?;

        while self.match_types(&[TokenType::Pow]) {
            let right = ensure_sufficient_stack(|| self.factor())?;
            let span = left.span().to(right.span());
            left = Node::BinaryOp {
                left: Box::new(left),
                operator: BinaryOp::Power,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Left-associative chain of `operand (op operand)*`.
    fn binary_op(
        &mut self,
        operand: fn(&mut Self) -> Result<Node, XbError>,
        operators: &[(TokenType, BinaryOp)],
    ) -> Result<Node, XbError> {
        let mut left = operand(self)?;

        while let Some(operator) = self.match_operator(operators) {
            let right = operand(self)?;
            let span = left.span().to(right.span());
            left = Node::BinaryOp {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn match_operator(&mut self, operators: &[(TokenType, BinaryOp)]) -> Option<BinaryOp> {
        let found = operators
            .iter()
            .find(|(token_type, _)| self.check(*token_type))
            .map(|(_, operator)| *operator);
        if found.is_some() {
            self.advance();
        }
        found
    }

    fn call(&mut self) -> Result<Node, XbError> {
        let mut node = self.atom()?;

        while self.match_types(&[TokenType::LeftParen]) {
            let mut args = Vec::new();

            if !self.check(TokenType::RightParen) {
                loop {
                    args.push(self.expression()?);
                    if !self.match_types(&[TokenType::Comma]) {
                        break;
                    }
                }
            }

            let paren = self.consume_with_help(
                TokenType::RightParen,
                "Expected ',' or ')'",
                "Function calls must be closed with ')' after the arguments. Example: f(a, b)"
                    .to_string(),
            )?;

            let span = node.span().to(&paren.span);
            node = Node::Call {
                callee: Box::new(node),
                args,
                span,
            };
        }

        Ok(node)
    }

    fn atom(&mut self) -> Result<Node, XbError> {
        let token = self.peek().clone();

        match token.token_type {
            TokenType::Int | TokenType::Float => {
                self.advance();
                let value = match token.value {
                    Some(Literal::Int(n)) => Number::Int(n),
                    Some(Literal::Float(n)) => Number::Float(n),
                    _ => {
                        return Err(XbError::invalid_syntax(
                            token.span,
                            "Malformed number literal".to_string(),
                        ))
                    }
                };
                Ok(Node::Number {
                    value,
                    span: token.span,
                })
            }
            TokenType::String => {
                self.advance();
                Ok(Node::String {
                    value: token.text().to_string(),
                    span: token.span,
                })
            }
            TokenType::Identifier => {
                self.advance();
                Ok(Node::VarAccess {
                    name: token.text().to_string(),
                    span: token.span,
                })
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume_with_help(
                    TokenType::RightParen,
                    "Expected ')'",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                        .to_string(),
                )?;
                Ok(expr)
            }
            TokenType::LeftSquare => self.list_expr(),
            TokenType::If => self.if_expr(),
            TokenType::For => self.for_expr(),
            TokenType::While => self.while_expr(),
            TokenType::Fn => self.func_def(),
            _ => {
                let help_msg = match token.token_type {
                    TokenType::RightParen => {
                        "Found ')' without matching '('. Check for unbalanced parentheses."
                    }
                    TokenType::RightSquare => {
                        "Found ']' without matching '['. Check for unbalanced brackets."
                    }
                    TokenType::Eof | TokenType::Newline => {
                        "Reached the end of the statement while expecting an expression."
                    }
                    _ => "Expected a literal value, variable, or parenthesized expression here.",
                };
                Err(XbError::invalid_syntax_with_help(
                    token.span,
                    ATOM_EXPECTED.to_string(),
                    help_msg.to_string(),
                ))
            }
        }
    }

    fn list_expr(&mut self) -> Result<Node, XbError> {
        let open = self.advance();
        let mut elements = Vec::new();

        if !self.check(TokenType::RightSquare) {
            loop {
                elements.push(self.expression()?);
                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let close = self.consume_with_help(
            TokenType::RightSquare,
            "Expected ',' or ']'",
            "List literals must be closed with ']' after the opening '['. Example: [1, 2, 3]"
                .to_string(),
        )?;

        Ok(Node::List {
            elements,
            span: open.span.to(&close.span),
        })
    }

    fn if_expr(&mut self) -> Result<Node, XbError> {
        let keyword = self.advance();
        let mut cases = Vec::new();
        let else_case = self.if_cases(&mut cases)?;

        Ok(Node::If {
            cases,
            else_case,
            span: keyword.span.to(&self.previous().span),
        })
    }

    /// One `<condition> THEN <body>` arm (its IF/ELIF keyword already
    /// consumed), followed by whatever arms come after it.
    fn if_cases(&mut self, cases: &mut Vec<IfCase>) -> Result<Option<ElseCase>, XbError> {
        let condition = self.expression()?;
        self.consume(TokenType::Then, "Expected 'THEN'")?;

        if self.match_types(&[TokenType::Newline]) {
            let body = self.statements()?;
            cases.push(IfCase {
                condition,
                body,
                suppress_value: true,
            });

            if self.match_types(&[TokenType::End]) {
                return Ok(None);
            }
            if !self.check(TokenType::Elif) && !self.check(TokenType::Else) {
                return Err(self.expected_end());
            }
        } else {
            let body = self.statement()?;
            cases.push(IfCase {
                condition,
                body,
                suppress_value: false,
            });
        }

        self.elif_or_else(cases)
    }

    fn elif_or_else(&mut self, cases: &mut Vec<IfCase>) -> Result<Option<ElseCase>, XbError> {
        if self.match_types(&[TokenType::Elif]) {
            return self.if_cases(cases);
        }

        if self.match_types(&[TokenType::Else]) {
            if self.match_types(&[TokenType::Newline]) {
                let body = self.statements()?;
                self.consume(TokenType::End, "Expected 'END'")?;
                return Ok(Some(ElseCase {
                    body: Box::new(body),
                    suppress_value: true,
                }));
            }

            let body = self.statement()?;
            return Ok(Some(ElseCase {
                body: Box::new(body),
                suppress_value: false,
            }));
        }

        Ok(None)
    }

    fn for_expr(&mut self) -> Result<Node, XbError> {
        let keyword = self.advance();

        let var_name = self.consume(TokenType::Identifier, "Expected identifier")?;
        self.consume(TokenType::Eq, "Expected '='")?;
        let start = self.expression()?;
        self.consume(TokenType::To, "Expected 'TO'")?;
        let end = self.expression()?;

        let step = if self.match_types(&[TokenType::Step]) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };

        self.consume(TokenType::Then, "Expected 'THEN'")?;
        let (body, suppress_value) = self.loop_body()?;

        Ok(Node::For {
            var_name: var_name.text().to_string(),
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            suppress_value,
            span: keyword.span.to(&self.previous().span),
        })
    }

    fn while_expr(&mut self) -> Result<Node, XbError> {
        let keyword = self.advance();

        let condition = self.expression()?;
        self.consume(TokenType::Then, "Expected 'THEN'")?;
        let (body, suppress_value) = self.loop_body()?;

        Ok(Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
            suppress_value,
            span: keyword.span.to(&self.previous().span),
        })
    }

    /// A block body up to `END`, or a single statement on the same line.
    fn loop_body(&mut self) -> Result<(Node, bool), XbError> {
        if self.match_types(&[TokenType::Newline]) {
            let body = self.statements()?;
            self.consume(TokenType::End, "Expected 'END'")?;
            Ok((body, true))
        } else {
            Ok((self.statement()?, false))
        }
    }

    fn func_def(&mut self) -> Result<Node, XbError> {
        let keyword = self.advance();

        let name = if self.check(TokenType::Identifier) {
            Some(self.advance().text().to_string())
        } else {
            None
        };

        self.consume_with_help(
            TokenType::LeftParen,
            "Expected '('",
            "Parameters follow the function name in parentheses. Example: FN add(a, b) -> a + b"
                .to_string(),
        )?;

        let mut params = Vec::new();
        if self.check(TokenType::Identifier) {
            params.push(self.advance().text().to_string());
            while self.match_types(&[TokenType::Comma]) {
                let param = self.consume(TokenType::Identifier, "Expected identifier")?;
                params.push(param.text().to_string());
            }
            self.consume(TokenType::RightParen, "Expected ',' or ')'")?;
        } else {
            self.consume(TokenType::RightParen, "Expected identifier or ')'")?;
        }

        if self.match_types(&[TokenType::Arrow]) {
            let body = self.expression()?;
            return Ok(Node::FuncDef {
                name,
                params,
                span: keyword.span.to(body.span()),
                body: Rc::new(body),
                auto_return: true,
            });
        }

        self.consume_with_help(
            TokenType::Newline,
            "Expected '->' or NEWLINE",
            "A function body is either '-> <expression>' or a block of lines closed by 'END'."
                .to_string(),
        )?;
        let body = self.statements()?;
        self.consume(TokenType::End, "Expected 'END'")?;

        Ok(Node::FuncDef {
            name,
            params,
            body: Rc::new(body),
            auto_return: false,
            span: keyword.span.to(&self.previous().span),
        })
    }

    fn expected_end(&self) -> XbError {
        XbError::invalid_syntax_with_help(
            self.peek().span.clone(),
            "Expected 'END'".to_string(),
            "Block forms of IF, FOR, WHILE and FN are closed with 'END'.".to_string(),
        )
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(*token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<Token, XbError> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(XbError::invalid_syntax(
                self.peek().span.clone(),
                message.to_string(),
            ))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<Token, XbError> {
        self.consume(token_type, message).map_err(|error| error.with_help(help))
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.current + 1).min(last)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenType::Eof)
    }
}

fn type_tag(token: &Token) -> Result<TypeTag, XbError> {
    match token.token_type {
        TokenType::Num => Ok(TypeTag::Num),
        TokenType::Text => Ok(TypeTag::Text),
        TokenType::List => Ok(TypeTag::List),
        _ => Err(XbError::invalid_syntax(
            token.span.clone(),
            "Expected 'num', 'text' or 'list'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Node, XbError> {
        let tokens = Lexer::new("<test>", text).make_tokens()?;
        Parser::new(tokens).parse()
    }

    /// A compact rendering of the tree for structural assertions.
    fn sexp(node: &Node) -> String {
        match node {
            Node::Number { value, .. } => value.to_string(),
            Node::String { value, .. } => format!("{:?}", value),
            Node::List { elements, .. } => {
                let inner: Vec<String> = elements.iter().map(sexp).collect();
                format!("[{}]", inner.join(" "))
            }
            Node::VarAccess { name, .. } => name.clone(),
            Node::VarAssign {
                name, value, dtype, ..
            } => format!("({} {} {})", dtype, name, sexp(value)),
            Node::BinaryOp {
                left,
                operator,
                right,
                ..
            } => format!("({} {} {})", operator, sexp(left), sexp(right)),
            Node::UnaryOp {
                operator, operand, ..
            } => match operator {
                UnaryOp::Negate => format!("(neg {})", sexp(operand)),
                UnaryOp::Not => format!("(not {})", sexp(operand)),
            },
            Node::Call { callee, args, .. } => {
                let inner: Vec<String> = args.iter().map(sexp).collect();
                format!("(call {} {})", sexp(callee), inner.join(" "))
            }
            Node::Return { value, .. } => match value {
                Some(value) => format!("(return {})", sexp(value)),
                None => "(return)".to_string(),
            },
            Node::Continue { .. } => "continue".to_string(),
            Node::Break { .. } => "break".to_string(),
            Node::If { cases, else_case, .. } => {
                let mut out = String::from("(if");
                for case in cases {
                    out.push_str(&format!(
                        " {}{}:{}",
                        sexp(&case.condition),
                        if case.suppress_value { "!" } else { "" },
                        sexp(&case.body)
                    ));
                }
                if let Some(else_case) = else_case {
                    out.push_str(&format!(
                        " else{}:{}",
                        if else_case.suppress_value { "!" } else { "" },
                        sexp(&else_case.body)
                    ));
                }
                out.push(')');
                out
            }
            Node::For {
                var_name,
                start,
                end,
                step,
                body,
                suppress_value,
                ..
            } => format!(
                "(for{} {} {} {} {} {})",
                if *suppress_value { "!" } else { "" },
                var_name,
                sexp(start),
                sexp(end),
                step.as_ref().map(|s| sexp(s)).unwrap_or_else(|| "_".to_string()),
                sexp(body)
            ),
            Node::While {
                condition,
                body,
                suppress_value,
                ..
            } => format!(
                "(while{} {} {})",
                if *suppress_value { "!" } else { "" },
                sexp(condition),
                sexp(body)
            ),
            Node::FuncDef {
                name,
                params,
                body,
                auto_return,
                ..
            } => format!(
                "(fn{} {} ({}) {})",
                if *auto_return { "->" } else { "" },
                name.as_deref().unwrap_or("_"),
                params.join(" "),
                sexp(body)
            ),
        }
    }

    fn tree(text: &str) -> String {
        match parse(text) {
            Ok(node) => sexp(&node),
            Err(error) => format!("error: {}", error),
        }
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(tree("1 + 2 * 3 - 4"), "[(- (+ 1 (* 2 3)) 4)]");
        assert_eq!(tree("-2 ^ 2"), "[(neg (^ 2 2))]");
        assert_eq!(tree("(1 + 2) / 3"), "[(/ (+ 1 2) 3)]");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(tree("2 ^ 3 ^ 2"), "[(^ 2 (^ 3 2))]");
        assert_eq!(tree("2 ^ -1"), "[(^ 2 (neg 1))]");
    }

    #[test]
    fn logic_binds_loosest() {
        assert_eq!(
            tree("not a == b and c < d or e"),
            "[(or (and (not (== a b)) (< c d)) e)]"
        );
        assert_eq!(tree("1 < 2 < 3"), "[(< (< 1 2) 3)]");
    }

    #[test]
    fn declarations() {
        assert_eq!(tree("num x = 1 + 2"), "[(num x (+ 1 2))]");
        assert_eq!(tree("list l = [1, \"a\", []]"), "[(list l [1 \"a\" []])]");
        assert_eq!(tree("s : text = \"hi\""), "[(text s \"hi\")]");
        assert_eq!(tree("num a = num b = 3"), "[(num a (num b 3))]");
    }

    #[test]
    fn calls_and_statements() {
        assert_eq!(tree("print(1, x)\nf()()"), "[(call print 1 x) (call (call f ) )]");
        assert_eq!(tree("1; 2\n\n3"), "[1 2 3]");
        assert_eq!(tree(""), "[]");
    }

    #[test]
    fn if_forms() {
        assert_eq!(
            tree("IF a THEN 1 ELIF b THEN 2 ELSE 3"),
            "[(if a:1 b:2 else:3)]"
        );
        assert_eq!(
            tree("IF a THEN\n1\nELSE\n2\nEND"),
            "[(if a!:[1] else!:[2])]"
        );
        assert_eq!(
            tree("IF a THEN\n1\nELIF b THEN\n2\nEND"),
            "[(if a!:[1] b!:[2])]"
        );
    }

    #[test]
    fn loop_forms() {
        assert_eq!(tree("FOR i = 0 TO 5 THEN i"), "[(for i 0 5 _ i)]");
        assert_eq!(
            tree("FOR i = 5 TO 0 STEP -1 THEN\nprint(i)\nEND"),
            "[(for! i 5 0 (neg 1) [(call print i)])]"
        );
        assert_eq!(
            tree("WHILE x < 3 THEN\nBREAK\nCONTINUE\nEND"),
            "[(while! (< x 3) [break continue])]"
        );
    }

    #[test]
    fn function_forms() {
        assert_eq!(tree("FN add(a, b) -> a + b"), "[(fn-> add (a b) (+ a b))]");
        assert_eq!(tree("FN () -> 1"), "[(fn-> _ () 1)]");
        assert_eq!(
            tree("FN f(x)\nRETURN x\nRETURN\nEND"),
            "[(fn f (x) [(return x) (return)])]"
        );
    }

    #[test]
    fn spans_cover_the_source() {
        let text = "num x = 1 + 2\nFOR i = 0 TO 3 THEN\n  print(i)\nEND";
        let program = parse(text).unwrap_or_else(|e| panic!("{}", e));
        let Node::List { elements, .. } = &program else {
            panic!("expected a statement list");
        };
        assert_eq!(elements[0].span().text(), "num x = 1 + 2");
        assert_eq!(
            elements[1].span().text(),
            "FOR i = 0 TO 3 THEN\n  print(i)\nEND"
        );
        if let Node::VarAssign { value, .. } = &elements[0] {
            assert_eq!(value.span().text(), "1 + 2");
        }
    }

    #[test]
    fn first_error_wins() {
        assert_eq!(tree("(1 + 2"), "error: Invalid Syntax: Expected ')'");
        assert_eq!(
            tree("1 2"),
            "error: Invalid Syntax: Token cannot appear after previous tokens"
        );
        assert_eq!(tree("num = 3"), "error: Invalid Syntax: Expected identifier");
        assert_eq!(tree("x : int = 3"), "error: Invalid Syntax: Expected 'num', 'text' or 'list'");
        assert_eq!(tree("IF a THEN\n1\n"), "error: Invalid Syntax: Expected 'END'");
        assert_eq!(tree("FOR i = 1 THEN 2"), "error: Invalid Syntax: Expected 'TO'");
        assert_eq!(tree("FN f(a b) -> 1"), "error: Invalid Syntax: Expected ',' or ')'");
        assert_eq!(tree("FN f() 1"), "error: Invalid Syntax: Expected '->' or NEWLINE");
        assert_eq!(tree("f(1, 2,)"), format!("error: Invalid Syntax: {}", ATOM_EXPECTED));
    }
}
