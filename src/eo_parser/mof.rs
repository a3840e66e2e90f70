//! MOF embedded instances.
//!
//! The accepted grammar is the instance declaration subset of MOF:
//!
//! ```text
//! [qualifiers] instance of ClassName {
//!     [qualifiers] Name = value;
//!     ...
//! };
//! ```
//!
//! Values are string literals (adjacent literals are joined), `TRUE`/`FALSE`,
//! `NULL`, integers (decimal or `0x` hexadecimal), reals and `{ ... }` arrays of those.
//! Integers are stored as `sint64`, or `uint64` when they don't fit.
//! `NULL` leaves the property unset.

use log::debug;

use crate::broker::Broker;
use crate::instance::Instance;
use crate::variant::Variant;
use crate::{CMPIError, CMPIResult};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(String),
    Punct(char),
}

fn error(msg: impl AsRef<str>) -> CMPIError {
    CMPIError::Failed(format!("Unable to parse MOF embedded instance: {}", msg.as_ref()))
}

fn tokenize(input: &str) -> CMPIResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '/' {
            chars.next();
            match chars.next() {
                Some((_, '/')) => {
                    while let Some((_, c)) = chars.next() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some((_, '*')) => {
                    let mut last = ' ';
                    loop {
                        match chars.next() {
                            Some((_, '/')) if last == '*' => break,
                            Some((_, c)) => last = c,
                            None => return Err(error("unterminated comment")),
                        }
                    }
                }
                _ => return Err(error(format!("unexpected `/` at {}", pos))),
            }
        } else if c == '"' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some((_, '"')) => break,
                    Some((_, '\\')) => match chars.next() {
                        Some((_, 'n')) => s.push('\n'),
                        Some((_, 't')) => s.push('\t'),
                        Some((_, 'r')) => s.push('\r'),
                        Some((_, other)) => s.push(other),
                        None => return Err(error("unterminated string")),
                    },
                    Some((_, c)) => s.push(c),
                    None => return Err(error("unterminated string")),
                }
            }
            tokens.push(Token::Str(s));
        } else if c.is_ascii_digit() || c == '.' {
            let mut s = String::new();
            while let Some(&(_, c)) = chars.peek() {
                let exponent_sign = (c == '+' || c == '-')
                    && s.ends_with(|l: char| l == 'e' || l == 'E')
                    && !s.starts_with("0x");
                if c.is_ascii_alphanumeric() || c == '.' || exponent_sign {
                    s.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(s));
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let mut s = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    s.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(s));
        } else {
            chars.next();
            tokens.push(Token::Punct(c));
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek() == Some(&Token::Punct(c))
    }

    fn expect_punct(&mut self, c: char) -> CMPIResult<()> {
        match self.next() {
            Some(Token::Punct(p)) if p == c => Ok(()),
            other => Err(error(format!("expected `{}`, got {:?}", c, other))),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> CMPIResult<()> {
        match self.next() {
            Some(Token::Ident(ref s)) if s.eq_ignore_ascii_case(keyword) => Ok(()),
            other => Err(error(format!("expected `{}`, got {:?}", keyword, other))),
        }
    }

    fn ident(&mut self) -> CMPIResult<String> {
        match self.next() {
            Some(Token::Ident(s)) => Ok(s),
            other => Err(error(format!("expected a name, got {:?}", other))),
        }
    }

    // Qualifier lists carry nothing an instance needs, so they are skipped.
    fn skip_qualifiers(&mut self) -> CMPIResult<()> {
        if !self.at_punct('[') {
            return Ok(());
        }

        let mut depth = 0;
        loop {
            match self.next() {
                Some(Token::Punct('[')) => depth += 1,
                Some(Token::Punct(']')) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(error("unterminated qualifier list")),
            }
        }
    }

    fn number(text: &str, negative: bool) -> CMPIResult<Variant> {
        let lower = text.to_ascii_lowercase();

        if let Some(hex) = lower.strip_prefix("0x") {
            let magnitude = u64::from_str_radix(hex, 16)
                .map_err(|e| error(format!("bad number `{}`: {}", text, e)))?;
            return Ok(Self::integer(magnitude, negative));
        }

        if lower.contains(|c| c == '.' || c == 'e') {
            let value: f64 = lower
                .parse()
                .map_err(|e| error(format!("bad number `{}`: {}", text, e)))?;
            return Ok(Variant::R8(if negative { -value } else { value }));
        }

        let magnitude: u64 = lower
            .parse()
            .map_err(|e| error(format!("bad number `{}`: {}", text, e)))?;

        Ok(Self::integer(magnitude, negative))
    }

    fn integer(magnitude: u64, negative: bool) -> Variant {
        if negative {
            Variant::I8((magnitude as i64).wrapping_neg())
        } else if magnitude > i64::MAX as u64 {
            Variant::UI8(magnitude)
        } else {
            Variant::I8(magnitude as i64)
        }
    }

    fn value(&mut self) -> CMPIResult<Variant> {
        match self.next() {
            Some(Token::Str(mut s)) => {
                while let Some(Token::Str(more)) = self.peek() {
                    s.push_str(more);
                    self.pos += 1;
                }
                Ok(Variant::String(s))
            }
            Some(Token::Number(n)) => Self::number(&n, false),
            Some(Token::Punct('-')) => match self.next() {
                Some(Token::Number(n)) => Self::number(&n, true),
                other => Err(error(format!("expected a number, got {:?}", other))),
            },
            Some(Token::Punct('+')) => match self.next() {
                Some(Token::Number(n)) => Self::number(&n, false),
                other => Err(error(format!("expected a number, got {:?}", other))),
            },
            Some(Token::Ident(ref s)) if s.eq_ignore_ascii_case("true") => Ok(Variant::Bool(true)),
            Some(Token::Ident(ref s)) if s.eq_ignore_ascii_case("false") => Ok(Variant::Bool(false)),
            Some(Token::Ident(ref s)) if s.eq_ignore_ascii_case("null") => Ok(Variant::Null),
            Some(Token::Punct('{')) => {
                let mut items = Vec::new();
                if self.at_punct('}') {
                    self.pos += 1;
                    return Ok(Variant::Array(items));
                }
                loop {
                    let item = self.value()?;
                    if !item.is_null() {
                        items.push(item);
                    }
                    match self.next() {
                        Some(Token::Punct(',')) => continue,
                        Some(Token::Punct('}')) => break,
                        other => return Err(error(format!("expected `,` or `}}`, got {:?}", other))),
                    }
                }
                Ok(Variant::Array(items))
            }
            other => Err(error(format!("expected a value, got {:?}", other))),
        }
    }

    fn instance<B>(&mut self, broker: &B, ns: &str) -> CMPIResult<Instance>
    where
        B: Broker + ?Sized,
    {
        self.skip_qualifiers()?;
        self.expect_keyword("instance")?;
        self.expect_keyword("of")?;
        let class = self.ident()?;

        debug!("Instance of {}", class);

        let op = broker.new_object_path(ns, &class).map_err(|e| {
            debug!("Unable to create path for {}:{}: {}", ns, class, e);
            CMPIError::Failed(format!("Unable to create path for {}:{}", ns, class))
        })?;
        let mut inst = broker.new_instance(&op).map_err(|e| {
            debug!("Unable to create inst for {}:{}: {}", ns, class, e);
            CMPIError::Failed(format!("Unable to create instance for {}:{}", ns, class))
        })?;

        // An alias, as in `instance of Foo as $foo`.
        if let Some(Token::Ident(s)) = self.peek() {
            if s.eq_ignore_ascii_case("as") {
                self.pos += 1;
                self.ident()?;
            }
        }

        self.expect_punct('{')?;

        while !self.at_punct('}') {
            self.skip_qualifiers()?;
            let name = self.ident()?;
            self.expect_punct('=')?;
            let value = self.value()?;
            self.expect_punct(';')?;

            if value.is_null() {
                debug!("Property {} is NULL", name);
                continue;
            }

            debug!("Property {}: {}", name, value.cim_type());
            inst.set_property(name, value);
        }

        self.expect_punct('}')?;
        if self.at_punct(';') {
            self.pos += 1;
        }

        if let Some(token) = self.peek() {
            return Err(error(format!("trailing input {:?}", token)));
        }

        Ok(inst)
    }
}

/// Parse a MOF instance declaration into a new instance in namespace `ns`.
pub fn parse_instance<B>(eo: &str, broker: &B, ns: &str) -> CMPIResult<Instance>
where
    B: Broker + ?Sized,
{
    let tokens = tokenize(eo)?;
    let mut parser = Parser { tokens, pos: 0 };

    parser.instance(broker, ns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::SimpleBroker;

    fn parse(eo: &str) -> CMPIResult<Instance> {
        parse_instance(eo, &SimpleBroker::new(), "root/virt")
    }

    #[test]
    fn it_parses_an_instance() {
        let inst = parse(
            r#"
            // A resource allocation request
            instance of Xen_MemResourceAllocationSettingData {
                InstanceID = "dom1/mem";
                ResourceType = 4;
                VirtualQuantity = 0x100;
                Weight = -5;
                Ratio = 1.5e1;
                Enabled = TRUE;
                Caption = "multi" " part";
                Parent = NULL;
            };
            "#,
        )
        .unwrap();

        assert_eq!(inst.class_name(), "Xen_MemResourceAllocationSettingData");
        assert_eq!(inst.namespace(), "root/virt");
        assert_eq!(inst.get_property("InstanceID"), Some(&Variant::String("dom1/mem".into())));
        assert_eq!(inst.get_property("ResourceType"), Some(&Variant::I8(4)));
        assert_eq!(inst.get_property("VirtualQuantity"), Some(&Variant::I8(256)));
        assert_eq!(inst.get_property("Weight"), Some(&Variant::I8(-5)));
        assert_eq!(inst.get_property("Ratio"), Some(&Variant::R8(15.0)));
        assert_eq!(inst.get_property("Enabled"), Some(&Variant::Bool(true)));
        assert_eq!(inst.get_property("Caption"), Some(&Variant::String("multi part".into())));
        assert_eq!(inst.get_property("Parent"), None);
    }

    #[test]
    fn it_parses_arrays_and_qualifiers() {
        let inst = parse(
            r#"[Description("test")] INSTANCE OF Foo as $foo {
                /* block
                   comment */
                [Key] Ids = {1, 2, 18446744073709551615};
                Names = {"a\"b", "c"};
                Empty = {};
            }"#,
        )
        .unwrap();

        assert_eq!(
            inst.get_property("Ids"),
            Some(&Variant::Array(vec![Variant::I8(1), Variant::I8(2), Variant::UI8(u64::MAX)]))
        );
        assert_eq!(
            inst.get_property("Names"),
            Some(&Variant::Array(vec![
                Variant::String("a\"b".into()),
                Variant::String("c".into())
            ]))
        );
        assert_eq!(inst.get_property("Empty"), Some(&Variant::Array(vec![])));
    }

    #[test]
    fn it_rejects_malformed_input() {
        assert!(parse("instance Foo { };").is_err());
        assert!(parse("instance of Foo { A = ; };").is_err());
        assert!(parse("instance of Foo { A = \"x\" };").is_err());
        assert!(parse("instance of Foo { A = 1; }; extra").is_err());
        assert!(parse("instance of Foo { A = \"open").is_err());
        assert!(parse("not an instance").is_err());
    }
}
