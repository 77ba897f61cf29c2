use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while1},
    character::complete::{char, multispace0, multispace1, space1},
    number::complete::double,
    sequence::{delimited, preceded, tuple},
    IResult,
};

pub(crate) fn double_entry(line: &str) -> IResult<&str, f64> {
    preceded(space1, double)(line)
}

pub(crate) fn any_entry(line: &str) -> IResult<&str, &str> {
    preceded(space1, non_space)(line)
}

pub(crate) fn non_space(line: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(line)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_till(|c| c == '\''), char('\'')),
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
    ))(input)
}

/// Parse a `<wgt id='ID'> VALUE </wgt>` entry into id and value
pub(crate) fn wgt_entry(input: &str) -> IResult<&str, (&str, f64)> {
    let (rest, _) = tuple((
        tag("<wgt"),
        multispace1,
        tag("id"),
        multispace0,
        char('='),
        multispace0,
    ))(input)?;
    let (rest, id) = quoted(rest)?;
    let (rest, _) = tuple((multispace0, char('>'), multispace0))(rest)?;
    let (rest, wgt) = double(rest)?;
    let (rest, _) = preceded(multispace0, tag("</wgt>"))(rest)?;
    Ok((rest, (id, wgt)))
}
