//! DSON: the one-line order notation.
//!
//! Units are `A`/`F` followed by a lowercase province, coasts are written
//! `prov/coast`. Actions are `H`, `- dest`, `S <unit> H`, `S <unit> - dest`,
//! `C A from - to` in movement phases, `R dest` and `D` in retreat phases,
//! and `B`, `D` or a lone `W` in adjustment phases. Lists are joined with
//! ` ; `.
//!
//! Orders carry no power, so parsing takes the power they belong to.

use thiserror::Error;

use crate::board::{
    Action, Adjustment, BuildOrder, Coast, Location, Order, Power, Province, RetreatAction,
    RetreatOrder, UnitKind,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DsonError {
    #[error("empty order")]
    Empty,
    #[error("unknown unit type '{0}'")]
    UnitKind(String),
    #[error("unknown province '{0}'")]
    Province(String),
    #[error("unknown coast '{0}'")]
    Coast(String),
    #[error("action '{action}' is not allowed in {phase} orders")]
    Action { action: String, phase: &'static str },
    #[error("expected {0}")]
    Expected(&'static str),
    #[error("trailing input '{0}'")]
    Trailing(String),
}

fn location_str(loc: Location) -> String {
    match loc.coast {
        Coast::None => loc.province.abbr().to_string(),
        c => format!("{}/{}", loc.province.abbr(), c.abbr()),
    }
}

fn unit_str(kind: UnitKind, at: Location) -> String {
    format!("{} {}", kind.letter(), location_str(at))
}

pub fn format_order(order: &Order) -> String {
    let unit = unit_str(order.kind, order.at);
    match order.action {
        Action::Hold => format!("{unit} H"),
        Action::Move { to } => format!("{unit} - {}", location_str(to)),
        Action::SupportHold { target, kind } => {
            format!("{unit} S {} {} H", kind.letter(), target.abbr())
        }
        Action::SupportMove { from, to, kind } => {
            format!("{unit} S {} {} - {}", kind.letter(), from.abbr(), to.abbr())
        }
        Action::Convoy { from, to } => format!("{unit} C A {} - {}", from.abbr(), to.abbr()),
    }
}

pub fn format_retreat(order: &RetreatOrder) -> String {
    let unit = unit_str(order.kind, order.at);
    match order.action {
        RetreatAction::Move(to) => format!("{unit} R {}", location_str(to)),
        RetreatAction::Disband => format!("{unit} D"),
    }
}

pub fn format_build(order: &BuildOrder) -> String {
    match order.adjustment {
        Adjustment::Build { kind, at } => format!("{} B", unit_str(kind, at)),
        Adjustment::Disband { kind, at } => format!("{} D", unit_str(kind, at)),
        Adjustment::Waive => "W".to_string(),
    }
}

/// Joins any displayable orders with ` ; `.
pub fn format_orders<T: std::fmt::Display>(orders: &[T]) -> String {
    orders.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ; ")
}

/// Whitespace-separated tokens with positional helpers.
struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Tokens { inner: s.split_whitespace() }
    }

    fn next(&mut self, what: &'static str) -> Result<&'a str, DsonError> {
        self.inner.next().ok_or(DsonError::Expected(what))
    }

    fn expect(&mut self, token: &'static str) -> Result<(), DsonError> {
        if self.next(token)? == token {
            Ok(())
        } else {
            Err(DsonError::Expected(token))
        }
    }

    fn kind(&mut self) -> Result<UnitKind, DsonError> {
        let t = self.next("unit type")?;
        match t {
            "A" => Ok(UnitKind::Army),
            "F" => Ok(UnitKind::Fleet),
            other => Err(DsonError::UnitKind(other.to_string())),
        }
    }

    fn location(&mut self) -> Result<Location, DsonError> {
        let t = self.next("province")?;
        let (prov, coast) = match t.split_once('/') {
            Some((p, c)) => {
                (p, Coast::from_abbr(c).ok_or_else(|| DsonError::Coast(c.to_string()))?)
            }
            None => (t, Coast::None),
        };
        let province =
            Province::from_abbr(prov).ok_or_else(|| DsonError::Province(prov.to_string()))?;
        Ok(Location::with_coast(province, coast))
    }

    fn province(&mut self) -> Result<Province, DsonError> {
        Ok(self.location()?.province)
    }

    fn unit(&mut self) -> Result<(UnitKind, Location), DsonError> {
        Ok((self.kind()?, self.location()?))
    }

    fn finish<T>(mut self, value: T) -> Result<T, DsonError> {
        match self.inner.next() {
            None => Ok(value),
            Some(t) => Err(DsonError::Trailing(t.to_string())),
        }
    }
}

fn wrong_phase(action: &str, phase: &'static str) -> DsonError {
    DsonError::Action { action: action.to_string(), phase }
}

/// Parses one movement-phase order.
pub fn parse_order(s: &str, power: Power) -> Result<Order, DsonError> {
    if s.trim().is_empty() {
        return Err(DsonError::Empty);
    }
    let mut t = Tokens::new(s);
    let (kind, at) = t.unit()?;
    let order = match t.next("action")? {
        "H" => Order::hold(power, kind, at),
        "-" => Order::moving(power, kind, at, t.location()?),
        "S" => {
            let (target_kind, target) = t.unit()?;
            match t.next("H or -")? {
                "H" => Order::support_hold(power, kind, at, target.province, target_kind),
                "-" => {
                    let to = t.province()?;
                    Order::support_move(power, kind, at, target.province, to, target_kind)
                }
                _ => return Err(DsonError::Expected("H or -")),
            }
        }
        "C" => {
            t.expect("A")?;
            let from = t.province()?;
            t.expect("-")?;
            Order::convoy(power, at, from, t.province()?)
        }
        other => return Err(wrong_phase(other, "movement")),
    };
    t.finish(order)
}

/// Parses one retreat-phase order.
pub fn parse_retreat(s: &str, power: Power) -> Result<RetreatOrder, DsonError> {
    if s.trim().is_empty() {
        return Err(DsonError::Empty);
    }
    let mut t = Tokens::new(s);
    let (kind, at) = t.unit()?;
    let order = match t.next("action")? {
        "R" => RetreatOrder::retreat(power, kind, at, t.location()?),
        "D" => RetreatOrder::disband(power, kind, at),
        other => return Err(wrong_phase(other, "retreat")),
    };
    t.finish(order)
}

/// Parses one adjustment-phase order.
pub fn parse_build(s: &str, power: Power) -> Result<BuildOrder, DsonError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(DsonError::Empty);
    }
    if trimmed == "W" {
        return Ok(BuildOrder::waive(power));
    }
    let mut t = Tokens::new(trimmed);
    let (kind, at) = t.unit()?;
    let order = match t.next("action")? {
        "B" => BuildOrder::build(power, kind, at),
        "D" => BuildOrder::disband(power, kind, at),
        other => return Err(wrong_phase(other, "build")),
    };
    t.finish(order)
}

/// Parses a ` ; `-separated list with `parse`. Blank input is an empty list.
pub fn parse_orders<T>(
    s: &str,
    power: Power,
    parse: fn(&str, Power) -> Result<T, DsonError>,
) -> Result<Vec<T>, DsonError> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse(part, power))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Province::*;

    const P: Power = Power::Russia;

    #[test]
    fn movement_forms_round_trip() {
        let orders = [
            Order::hold(P, UnitKind::Army, Location::new(Mos)),
            Order::moving(
                P,
                UnitKind::Fleet,
                Location::new(Bar),
                Location::with_coast(Stp, Coast::North),
            ),
            Order::moving(
                P,
                UnitKind::Fleet,
                Location::with_coast(Stp, Coast::South),
                Location::new(Bot),
            ),
            Order::support_hold(P, UnitKind::Army, Location::new(War), Mos, UnitKind::Army),
            Order::support_move(P, UnitKind::Army, Location::new(Gal), Bud, Rum, UnitKind::Army),
            Order::convoy(P, Location::new(Bla), Sev, Arm),
        ];
        for o in orders {
            let text = format_order(&o);
            assert_eq!(parse_order(&text, P), Ok(o), "{text}");
        }
    }

    #[test]
    fn formats_canonical_text() {
        let o =
            Order::support_move(P, UnitKind::Fleet, Location::new(Adr), Tri, Ven, UnitKind::Fleet);
        assert_eq!(format_order(&o), "F adr S F tri - ven");
        let c = Order::convoy(P, Location::new(Mao), Bre, Spa);
        assert_eq!(c.to_string(), "F mao C A bre - spa");
        let stp = Location::with_coast(Stp, Coast::North);
        let r = RetreatOrder::retreat(P, UnitKind::Fleet, stp, Location::new(Nwy));
        assert_eq!(format_retreat(&r), "F stp/nc R nwy");
        assert_eq!(format_build(&BuildOrder::waive(P)), "W");
    }

    #[test]
    fn retreat_and_build_phases() {
        assert_eq!(
            parse_retreat("A vie R boh", P),
            Ok(RetreatOrder::retreat(P, UnitKind::Army, Location::new(Vie), Location::new(Boh)))
        );
        assert_eq!(
            parse_retreat("A vie D", P),
            Ok(RetreatOrder::disband(P, UnitKind::Army, Location::new(Vie)))
        );
        assert_eq!(
            parse_build("F stp/nc B", P),
            Ok(BuildOrder::build(P, UnitKind::Fleet, Location::with_coast(Stp, Coast::North)))
        );
        assert_eq!(
            parse_build("A mos D", P),
            Ok(BuildOrder::disband(P, UnitKind::Army, Location::new(Mos)))
        );
        assert_eq!(parse_build(" W ", P), Ok(BuildOrder::waive(P)));
    }

    #[test]
    fn lists() {
        let text = "A vie H ; A bud - rum ; F tri - alb";
        let list = parse_orders(text, Power::Austria, parse_order).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(format_orders(&list), "A vie H ; A bud - rum ; F tri - alb");
        assert_eq!(parse_orders("", P, parse_build), Ok(Vec::new()));
    }

    #[test]
    fn errors() {
        assert_eq!(parse_order("", P), Err(DsonError::Empty));
        assert_eq!(parse_order("X vie H", P), Err(DsonError::UnitKind("X".into())));
        assert_eq!(parse_order("A xyz H", P), Err(DsonError::Province("xyz".into())));
        assert_eq!(parse_order("A vie", P), Err(DsonError::Expected("action")));
        assert_eq!(
            parse_order("A vie R boh", P),
            Err(DsonError::Action { action: "R".into(), phase: "movement" })
        );
        assert_eq!(parse_order("A vie H now", P), Err(DsonError::Trailing("now".into())));
        assert_eq!(parse_order("F mao C F bre - spa", P), Err(DsonError::Expected("A")));
        assert_eq!(parse_order("F stp/xc - bot", P), Err(DsonError::Coast("xc".into())));
    }
}
