// File: src/services/bridge/parser.rs
use crate::storage::blob::models::zone_record::PricePoint;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

/// Документ рыночных цен, извлечённый из входящего XML ENTSO-E.
/// Все точки уже приведены к абсолютным меткам времени UTC.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub zone: String,
    pub zone_name: Option<String>,
    pub currency: String,
    pub sequence: i64,
    /// Эффективное разрешение документа: 15 или 60 минут
    pub resolution_min: u32,
    pub points: Vec<PricePoint>,
}

#[derive(Debug, Default)]
struct RawPeriod {
    start: Option<String>,
    resolution: Option<String>,
    points: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct RawDocument {
    zone: Option<String>,
    zone_name: Option<String>,
    currency: Option<String>,
    sequence: Option<String>,
    periods: Vec<RawPeriod>,
}

/// Разбирает входящий market document. Возвращает None, если документ
/// не содержит идентификатора зоны; отдельные некорректные точки
/// отбрасываются молча, а не валят весь разбор.
pub fn parse_document(xml: &str) -> Option<ParsedDocument> {
    let raw = extract(xml);
    let zone = raw.zone?;

    let sequence = raw
        .sequence
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(1);
    let currency = raw.currency.unwrap_or_else(|| "EUR".to_string());

    // Политика эффективного разрешения: любое вхождение PT15M делает
    // весь документ четвертьчасовым, остальные периоды пропускаются
    // целиком — смешивать разрешения в одном слиянии нельзя.
    let effective_res: i64 = if raw
        .periods
        .iter()
        .any(|p| p.resolution.as_deref().is_some_and(|r| r.contains("PT15M")))
    {
        15
    } else {
        60
    };

    let mut points = Vec::new();
    for period in &raw.periods {
        let period_res = match period.resolution.as_deref() {
            Some(r) if r.contains("PT15M") => 15,
            // Отсутствующее или нераспознанное разрешение считается часовым
            _ => 60,
        };
        if period_res != effective_res {
            debug!(
                "Skipping period at {:?}: resolution {:?} differs from effective PT{}M",
                period.start, period.resolution, effective_res
            );
            continue;
        }
        let Some(start) = period.start.as_deref().and_then(parse_instant) else {
            continue;
        };
        for (pos_raw, price_raw) in &period.points {
            let Ok(position) = pos_raw.parse::<i64>() else {
                continue;
            };
            if position < 1 {
                continue;
            }
            // Знак цены обязан сохраняться: отрицательные цены валидны
            let Ok(price) = price_raw.parse::<f64>() else {
                continue;
            };
            if !price.is_finite() {
                continue;
            }
            let time = start + Duration::minutes((position - 1) * effective_res);
            points.push(PricePoint { time, price });
        }
    }

    Some(ParsedDocument {
        zone,
        zone_name: raw.zone_name,
        currency,
        sequence,
        resolution_min: effective_res as u32,
        points,
    })
}

/// Толерантное извлечение полей: имена тегов сравниваются без учёта
/// регистра и namespace-префикса, атрибуты игнорируются, для скалярных
/// полей побеждает первое вхождение.
fn extract(xml: &str) -> RawDocument {
    let mut reader = Reader::from_str(xml);
    let mut doc = RawDocument::default();
    let mut period: Option<RawPeriod> = None;
    let mut point: Option<(Option<String>, Option<String>)> = None;
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = lower_local(e.name().as_ref());
                match tag.as_str() {
                    "period" => period = Some(RawPeriod::default()),
                    "point" => point = Some((None, None)),
                    _ => {}
                }
                current = Some(tag);
            }
            Ok(Event::Text(t)) => {
                let Some(tag) = current.clone() else { continue };
                let value = t
                    .unescape()
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default();
                if value.is_empty() {
                    continue;
                }
                apply_field(&mut doc, &mut period, &mut point, &tag, value);
            }
            Ok(Event::End(e)) => {
                match lower_local(e.name().as_ref()).as_str() {
                    "point" => {
                        if let (Some((Some(pos), Some(price))), Some(per)) =
                            (point.take(), period.as_mut())
                        {
                            per.points.push((pos, price));
                        }
                    }
                    "period" => {
                        if let Some(p) = period.take() {
                            doc.periods.push(p);
                        }
                    }
                    _ => {}
                }
                current = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                // Битая разметка: оставляем то, что успели извлечь
                debug!("Stopping XML scan on parse error: {}", e);
                break;
            }
        }
    }

    doc
}

fn apply_field(
    doc: &mut RawDocument,
    period: &mut Option<RawPeriod>,
    point: &mut Option<(Option<String>, Option<String>)>,
    tag: &str,
    value: String,
) {
    if let Some((pos, price)) = point.as_mut() {
        match tag {
            "position" if pos.is_none() => *pos = Some(value),
            "price.amount" if price.is_none() => *price = Some(value),
            _ => {}
        }
        return;
    }
    if let Some(per) = period.as_mut() {
        match tag {
            "start" if per.start.is_none() => per.start = Some(value),
            "resolution" if per.resolution.is_none() => per.resolution = Some(value),
            _ => {}
        }
        return;
    }
    match tag {
        "out_domain.mrid" if doc.zone.is_none() => doc.zone = Some(value),
        "out_domain.name" if doc.zone_name.is_none() => doc.zone_name = Some(value),
        "currency_unit.name" if doc.currency.is_none() => doc.currency = Some(value),
        "order_detail.nrid" if doc.sequence.is_none() => doc.sequence = Some(value),
        _ => {}
    }
}

fn lower_local(qname: &[u8]) -> String {
    let local = qname.rsplit(|b| *b == b':').next().unwrap_or(qname);
    String::from_utf8_lossy(local).to_ascii_lowercase()
}

/// Начала интервалов ENTSO-E приходят как RFC 3339 либо без секунд
/// ("2026-01-01T00:00Z")
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|n| n.and_utc())
}
