use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CountdownCLI {
    /// Override configuration root path value, can also be override using $COUNTDOWN_ROOT
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CLISubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CLISubcommand {
    /// Show every event and the time left until it
    List,
    /// Create a new event, the date defaults to right now
    Add {
        /// Name of the event
        name: String,
        /// Day of the event (DD/MM/YYYY)
        #[arg(short, long, value_parser = parse_date::parse_date_arg, conflicts_with = "today")]
        date: Option<NaiveDate>,
        /// Use today as the day of the event, keeping the chosen time
        #[arg(long)]
        today: bool,
        /// Time of the event (HH:MM or HH:MM:SS)
        #[arg(short, long, value_parser = parse_date::parse_time_arg, conflicts_with = "clear_time")]
        time: Option<NaiveTime>,
        /// Set the time of the event to midnight
        #[arg(long)]
        clear_time: bool,
    },
    /// Delete an event
    Delete {
        /// Id of the event, as shown by `list`
        id: String,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Keep counting down until interrupted
    Watch,
}

mod parse_date {
    use chrono::{NaiveDate, NaiveTime};
    use nom::{
        bytes::complete::{tag, take_while_m_n},
        combinator::{map_res, opt},
        sequence::preceded,
        IResult,
    };

    pub fn parse_date_arg(date: &str) -> Result<NaiveDate, String> {
        match parse_date(date) {
            Ok(("", (day, month, year))) => NaiveDate::from_ymd_opt(year as i32, month, day)
                .ok_or_else(|| format!("{date} is not a valid day")),
            Ok((remaining, _)) => Err(format!(
                "Could not parse this remaining date fragment: {remaining}"
            )),
            Err(error) => Err(error.to_string()),
        }
    }

    pub fn parse_time_arg(time: &str) -> Result<NaiveTime, String> {
        match parse_time(time) {
            Ok(("", (hours, minutes, seconds))) => {
                NaiveTime::from_hms_opt(hours, minutes, seconds.unwrap_or(0))
                    .ok_or_else(|| format!("{time} is not a valid time"))
            }
            Ok((remaining, _)) => Err(format!(
                "Could not parse this remaining time fragment: {remaining}"
            )),
            Err(error) => Err(error.to_string()),
        }
    }

    /// DD/MM/YYYY
    fn parse_date(i: &str) -> IResult<&str, (u32, u32, u32)> {
        let (i, day) = number(1, 2)(i)?;
        let (i, month) = preceded(tag("/"), number(1, 2))(i)?;
        let (i, year) = preceded(tag("/"), number(4, 4))(i)?;

        Ok((i, (day, month, year)))
    }

    /// HH:MM[:SS]
    fn parse_time(i: &str) -> IResult<&str, (u32, u32, Option<u32>)> {
        let (i, hours) = number(1, 2)(i)?;
        let (i, minutes) = preceded(tag(":"), number(2, 2))(i)?;
        let (i, seconds) = opt(preceded(tag(":"), number(2, 2)))(i)?;

        Ok((i, (hours, minutes, seconds)))
    }

    fn number<'a>(min: usize, max: usize) -> impl FnMut(&'a str) -> IResult<&'a str, u32> {
        map_res(take_while_m_n(min, max, |c: char| c.is_ascii_digit()), |i: &str| {
            i.parse::<u32>()
        })
    }

}
