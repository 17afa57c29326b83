use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday,
};
use combine::{
    attempt,
    error::UnexpectedParse,
    parser::{
        byte::{bytes_cmp, digit, spaces},
        choice::{choice, optional},
        range::recognize,
        repeat::{skip_many, skip_many1},
        token::{none_of, one_of, token},
    },
    Parser,
};

type Input<'a> = &'a [u8];

pub fn date_time<'a>() -> impl Parser<Input<'a>, Output = DateTime<FixedOffset>> {
    (
        optional(attempt((day_of_week(), token(b',')))),
        date(),
        time_of_day(),
        zone(),
        optional(cfws()),
    )
        .and_then(|(dow, date, time, tz, _)| {
            if let Some((dow, _)) = dow {
                if date.weekday() != dow {
                    return Err(UnexpectedParse::Unexpected);
                }
            }
            tz.from_local_datetime(&NaiveDateTime::new(date, time))
                .single()
                .ok_or(UnexpectedParse::Unexpected)
        })
}

macro_rules! keyword {
    ($($s:expr => $v:expr,)+) => {
        choice((
            $(attempt(bytes_cmp($s, |l, r| l.eq_ignore_ascii_case(&r))).map(|_| $v),)+
        ))
    }
}

fn day_of_week<'a>() -> impl Parser<Input<'a>, Output = Weekday> {
    (
        optional(cfws()),
        keyword! {
            b"mon" => Weekday::Mon,
            b"tue" => Weekday::Tue,
            b"wed" => Weekday::Wed,
            b"thu" => Weekday::Thu,
            b"fri" => Weekday::Fri,
            b"sat" => Weekday::Sat,
            b"sun" => Weekday::Sun,
        },
        optional(cfws()),
    )
        .map(|(_, dow, _)| dow)
}

fn date<'a>() -> impl Parser<Input<'a>, Output = NaiveDate> {
    (small_number(), month(), year()).and_then(|(day, month, year)| {
        NaiveDate::from_ymd_opt(year, month, day).ok_or(UnexpectedParse::Unexpected)
    })
}

fn month<'a>() -> impl Parser<Input<'a>, Output = u32> {
    keyword! {
        b"jan" => 1,
        b"feb" => 2,
        b"mar" => 3,
        b"apr" => 4,
        b"may" => 5,
        b"jun" => 6,
        b"jul" => 7,
        b"aug" => 8,
        b"sep" => 9,
        b"oct" => 10,
        b"nov" => 11,
        b"dec" => 12,
    }
}

fn year<'a>() -> impl Parser<Input<'a>, Output = i32> {
    (
        optional(cfws()),
        recognize(skip_many1(digit())),
        optional(cfws()),
    )
        .and_then(|(_, digits, _): (_, &[u8], _)| {
            let year = digits
                .iter()
                .fold(0i32, |acc, &d| acc.saturating_mul(10) + i32::from(d - b'0'));
            // Two-digit years follow the obsolete syntax of RFC 5322 4.3.
            match digits.len() {
                0 | 1 => Err(UnexpectedParse::Unexpected),
                2 if year < 50 => Ok(year + 2000),
                2 => Ok(year + 1900),
                _ => Ok(year),
            }
        })
}

fn time_of_day<'a>() -> impl Parser<Input<'a>, Output = NaiveTime> {
    // Single digit hour, minute and second are accepted as well.
    (
        small_number(),
        token(b':'),
        small_number(),
        optional((token(b':'), small_number())),
    )
        .and_then(|(hour, _, minute, second)| {
            let second = second.map_or(0, |(_, s)| s);
            // A leap second is stored as an overflowing millisecond.
            let (second, milli) = if second < 60 {
                (second, 0)
            } else {
                (59, (second - 59) * 1_000)
            };
            NaiveTime::from_hms_milli_opt(hour, minute, second, milli)
                .ok_or(UnexpectedParse::Unexpected)
        })
}

fn zone<'a>() -> impl Parser<Input<'a>, Output = FixedOffset> {
    let numeric = (
        spaces(),
        one_of(b"+-".iter().cloned()),
        digit(),
        digit(),
        digit(),
        digit(),
    )
        .map(|(_, sign, h1, h2, m1, m2)| {
            let secs = ((to_digit(h1) * 10 + to_digit(h2)) * 3600
                + (to_digit(m1) * 10 + to_digit(m2)) * 60) as i32;
            // -0000 carries no usable offset, so it is the same as +0000.
            if sign == b'-' {
                -secs
            } else {
                secs
            }
        });
    let obsolete = (
        spaces(),
        keyword! {
            b"ut" => 0,
            b"gmt" => 0,
            b"est" => -5 * 3600,
            b"edt" => -4 * 3600,
            b"cst" => -6 * 3600,
            b"cdt" => -5 * 3600,
            b"mst" => -7 * 3600,
            b"mdt" => -6 * 3600,
            b"pst" => -8 * 3600,
            b"pdt" => -7 * 3600,
        },
    )
        .map(|(_, secs)| secs);
    choice((attempt(numeric), obsolete))
        .and_then(|secs: i32| FixedOffset::east_opt(secs).ok_or(UnexpectedParse::Unexpected))
}

fn small_number<'a>() -> impl Parser<Input<'a>, Output = u32> {
    (optional(cfws()), digit(), optional(digit()), optional(cfws())).map(|(_, d1, d2, _)| {
        match d2 {
            Some(d2) => to_digit(d1) * 10 + to_digit(d2),
            None => to_digit(d1),
        }
    })
}

fn to_digit(b: u8) -> u32 {
    u32::from(b - b'0')
}

fn cfws<'a>() -> impl Parser<Input<'a>, Output = ()> {
    (spaces(), skip_many((comment(), spaces()))).map(|_| ())
}

fn comment<'a>() -> impl Parser<Input<'a>, Output = ()> {
    (
        token(b'('),
        skip_many(none_of(br"()\".iter().cloned())),
        token(b')'),
    )
        .map(|_| ())
}
