use alloc::vec;
use core::str::FromStr;

use anyhow::Result;
use pest::error::{Error, ErrorVariant};
use pest::iterators::Pair;
use pest::{Parser, Span};
use pest_derive::Parser;

use super::{Op, Payload, Script};
use crate::{FieldType, FieldValue, Id};

#[derive(Parser)]
#[grammar = "debug_utils/script/grammar.pest"]
pub struct ScriptParser;

/// Helper function to extract N sub-pairs when the layout of a rule is fixed.
fn extract<const N: usize>(pair: Pair<'_, Rule>, expected_rules: [Rule; N]) -> [Pair<'_, Rule>; N] {
    let mut out = [(); N].map(|()| pair.clone());
    let mut i = 0;
    for pair in pair.into_inner() {
        assert_eq!(pair.as_rule(), expected_rules[i]);
        out[i] = pair;
        i += 1;
    }
    assert_eq!(i, N);
    out
}

/// Helper function to emit a custom error at the given span.
fn custom_error(span: Span<'_>, msg: &str) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::<Rule>::CustomError {
            message: msg.into(),
        },
        span,
    )
}

fn parse_number<T: FromStr>(pair: Pair<'_, Rule>) -> Result<T> {
    Ok(pair.as_str().parse().map_err(|_| {
        // The rule only allows digits so this can only be an overflow.
        custom_error(pair.as_span(), "integer overflow")
    })?)
}

fn parse_id(pair: Pair<'_, Rule>) -> Result<Id> {
    let Some(pair) = pair.into_inner().next() else {
        unreachable!()
    };
    match pair.as_rule() {
        Rule::null_id => Ok(Id::NULL),
        Rule::generational_id => {
            let [index, generation] = extract(pair, [Rule::number, Rule::number]);
            Ok(Id::new(parse_number(index)?, parse_number(generation)?))
        }
        _ => unreachable!(),
    }
}

fn parse_field_type(pair: Pair<'_, Rule>) -> FieldType {
    match pair.as_str() {
        "u8" => FieldType::U8,
        "i32" => FieldType::I32,
        "i64" => FieldType::I64,
        "f32" => FieldType::F32,
        "f64" => FieldType::F64,
        _ => unreachable!(),
    }
}

fn parse_value<T: FromStr>(pair: &Pair<'_, Rule>, ty: FieldType) -> Result<T> {
    Ok(pair.as_str().parse().map_err(|_| {
        custom_error(pair.as_span(), &alloc::format!("invalid {ty} value"))
    })?)
}

fn parse_field_value(pair: Pair<'_, Rule>, ty: FieldType) -> Result<FieldValue> {
    Ok(match ty {
        FieldType::U8 => FieldValue::U8(parse_value(&pair, ty)?),
        FieldType::I32 => FieldValue::I32(parse_value(&pair, ty)?),
        FieldType::I64 => FieldValue::I64(parse_value(&pair, ty)?),
        FieldType::F32 => FieldValue::F32(parse_value(&pair, ty)?),
        FieldType::F64 => FieldValue::F64(parse_value(&pair, ty)?),
    })
}

fn parse_payload(pair: Pair<'_, Rule>) -> Payload {
    pair.into_inner()
        .map(|byte| {
            debug_assert_eq!(byte.as_rule(), Rule::hex_byte);
            // Two hex digits always fit in a byte.
            u8::from_str_radix(byte.as_str(), 16).unwrap_or_default()
        })
        .collect()
}

fn parse_op(pair: Pair<'_, Rule>) -> Result<Op> {
    Ok(match pair.as_rule() {
        Rule::create => Op::Create,
        Rule::clear => Op::Clear,
        Rule::recycle => {
            let [id] = extract(pair, [Rule::id]);
            Op::Recycle(parse_id(id)?)
        }
        Rule::remove => {
            let [id] = extract(pair, [Rule::id]);
            Op::Remove(parse_id(id)?)
        }
        Rule::insert => {
            let mut inner = pair.into_inner();
            let Some(id) = inner.next() else {
                unreachable!()
            };
            let payload = inner.next().map(parse_payload);
            Op::Insert(parse_id(id)?, payload)
        }
        Rule::swap => {
            let [a, b] = extract(pair, [Rule::number, Rule::number]);
            Op::Swap(parse_number(a)?, parse_number(b)?)
        }
        Rule::set_field => {
            let [id, offset, ty, value] = extract(
                pair,
                [Rule::id, Rule::number, Rule::field_type, Rule::value],
            );
            let ty = parse_field_type(ty);
            Op::SetField(
                parse_id(id)?,
                parse_number(offset)?,
                parse_field_value(value, ty)?,
            )
        }
        Rule::get_field => {
            let [id, offset, ty] = extract(pair, [Rule::id, Rule::number, Rule::field_type]);
            Op::GetField(parse_id(id)?, parse_number(offset)?, parse_field_type(ty))
        }
        _ => unreachable!(),
    })
}

impl Script {
    /// Parses the textual representation of a [`Script`].
    ///
    /// The text format is the same as the one produced by its `Display`
    /// implementation. `#` starts a comment which extends to the end of the
    /// line.
    pub fn parse(input: &str) -> Result<Self> {
        let parse_result = ScriptParser::parse(Rule::script, input)?;

        let mut script = Script {
            stride: 0,
            ops: vec![],
        };
        for pair in parse_result {
            match pair.as_rule() {
                Rule::stride_decl => {
                    let [number] = extract(pair, [Rule::number]);
                    script.stride = parse_number(number)?;
                }
                Rule::EOI => {}
                _ => script.ops.push(parse_op(pair)?),
            }
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use smallvec::smallvec;

    use super::*;

    #[test]
    fn parse_script() {
        let text = "
# A comment on its own line.
stride 4
create
insert 0v0 [0a 0B 00 ff]   # trailing comment
insert 4294967295v4294967295
insert 1v2 []

set_field 0v0 0 f32 -1.5e3
set_field 0v0 0 f64 NaN
get_field 0v0 2 u8
swap 0 1
remove null
recycle 3v7
clear
";
        let script = Script::parse(text).unwrap();
        assert_eq!(script.stride, 4);
        assert_eq!(script.ops.len(), 11);
        assert_eq!(script.ops[0], Op::Create);
        assert_eq!(
            script.ops[1],
            Op::Insert(Id::new(0, 0), Some(smallvec![0x0a, 0x0b, 0x00, 0xff]))
        );
        assert_eq!(script.ops[2], Op::Insert(Id::NULL, None));
        assert_eq!(script.ops[3], Op::Insert(Id::new(1, 2), Some(smallvec![])));
        assert_eq!(
            script.ops[4],
            Op::SetField(Id::new(0, 0), 0, FieldValue::F32(-1500.0))
        );
        assert!(matches!(
            script.ops[5],
            Op::SetField(_, 0, FieldValue::F64(v)) if v.is_nan()
        ));
        assert_eq!(script.ops[6], Op::GetField(Id::new(0, 0), 2, FieldType::U8));
        assert_eq!(script.ops[7], Op::Swap(0, 1));
        assert_eq!(script.ops[8], Op::Remove(Id::NULL));
        assert_eq!(script.ops[9], Op::Recycle(Id::new(3, 7)));
        assert_eq!(script.ops[10], Op::Clear);
    }

    #[test]
    fn display_round_trip() {
        let text = "stride 2\ncreate\ninsert 0v0 [01 02]\nset_field 0v0 0 i32 -7\nget_field 0v0 1 u8\nremove 0v0\n";
        let script = Script::parse(text).unwrap();
        assert_eq!(Script::parse(&script.to_string()).unwrap(), script);
    }

    #[test]
    fn errors() {
        assert!(Script::parse("create\n").is_err());
        assert!(Script::parse("stride 4\nrecycle 1\n").is_err());
        assert!(Script::parse("stride 4\nset_field 0v0 0 u8 300\n").is_err());
        assert!(Script::parse("stride 4\nset_field 0v0 0 i32 1.5\n").is_err());
        assert!(Script::parse("stride 4\ninsert 0v4294967296\n").is_err());
        assert!(Script::parse("stride 4\ninsert 0v0 [1]\n").is_err());
    }
}
