//! Custom-store XML export for the marketplace order pull.
//!
//! The marketplace polls `GET /shipstation_orders?action=export` and expects
//! an `<Orders pages="N">` document. Free-form fields (order tokens, the
//! comma-joined product list, the shipping JSON document) are wrapped in
//! CDATA so their content never needs escaping.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use crate::models::Order;

/// Date format the marketplace uses in export query strings and documents.
pub const EXPORT_DATE_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Orders per export page.
pub const EXPORT_PAGE_SIZE: u32 = 50;

/// Errors that can occur while rendering the export document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// XML writing failed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The rendered document was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parse a marketplace export timestamp (`MM/DD/YYYY HH:MM`, UTC).
///
/// # Errors
///
/// Returns `chrono::ParseError` if the string does not match the format.
pub fn parse_export_date(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(raw, EXPORT_DATE_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Render one export page as the marketplace's custom-store XML document.
///
/// `total_pages` is the page count across the whole filtered window, not
/// just this page; the marketplace uses it to decide whether to poll again.
///
/// # Errors
///
/// Returns `ExportError` if the document cannot be written.
pub fn render_orders_xml(orders: &[Order], total_pages: u64) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("Orders");
    root.push_attribute(("pages", total_pages.to_string().as_str()));
    writer.write_event(Event::Start(root))?;

    for order in orders {
        writer.write_event(Event::Start(BytesStart::new("Order")))?;

        write_cdata_element(&mut writer, "OrderID", order.id.as_str())?;
        write_text_element(
            &mut writer,
            "OrderDate",
            &order.created_at.format(EXPORT_DATE_FORMAT).to_string(),
        )?;
        write_cdata_element(&mut writer, "Products", &order.product_ids)?;
        write_cdata_element(&mut writer, "ShippingInfo", &order.shipping_info)?;
        write_text_element(
            &mut writer,
            "Shipped",
            if order.shipped { "true" } else { "false" },
        )?;

        writer.write_event(Event::End(BytesEnd::new("Order")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Orders")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_cdata_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::CData(BytesCData::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};
    use driftwood_core::OrderId;

    use super::*;

    fn order(product_ids: &str, shipping_info: &str) -> Order {
        Order {
            id: OrderId::generate(),
            product_ids: product_ids.to_string(),
            shipping_info: shipping_info.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 15, 14, 30, 0).unwrap(),
            shipped: true,
            exported_at: None,
        }
    }

    #[test]
    fn test_parse_export_date() {
        let parsed = parse_export_date("03/15/2026 14:30").unwrap();
        assert_eq!(parsed.month(), 3);
        assert_eq!(parsed.day(), 15);
        assert_eq!(parsed.year(), 2026);
        assert_eq!(parsed.hour(), 14);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_parse_export_date_rejects_iso_form() {
        assert!(parse_export_date("2026-03-15T14:30:00").is_err());
        assert!(parse_export_date("not a date").is_err());
    }

    #[test]
    fn test_render_document_structure() {
        let orders = vec![order("111,222", "{}"), order("36400651", "{}")];

        let xml = render_orders_xml(&orders, 3).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<Orders pages=\"3\">"));
        assert_eq!(xml.matches("<Order>").count(), 2);
        assert!(xml.contains("<Products><![CDATA[111,222]]></Products>"));
        assert!(xml.contains("<OrderDate>03/15/2026 14:30</OrderDate>"));
        assert!(xml.contains("<Shipped>true</Shipped>"));
        assert!(xml.ends_with("</Orders>"));
    }

    #[test]
    fn test_render_empty_page() {
        let xml = render_orders_xml(&[], 0).unwrap();

        assert!(xml.contains("<Orders pages=\"0\">"));
        assert!(!xml.contains("<Order>"));
    }

    #[test]
    fn test_cdata_preserves_shipping_json_verbatim() {
        let shipping = r#"{"name": "A & B <Co>", "street1": "482 Harborview Ave"}"#;
        let orders = vec![order("111", shipping)];

        let xml = render_orders_xml(&orders, 1).unwrap();

        // The JSON document must appear unescaped inside CDATA.
        assert!(xml.contains(&format!("<ShippingInfo><![CDATA[{shipping}]]></ShippingInfo>")));
        assert!(!xml.contains("&amp;"));
    }

    #[test]
    fn test_order_id_round_trips_through_cdata() {
        let o = order("111", "{}");
        let xml = render_orders_xml(std::slice::from_ref(&o), 1).unwrap();

        assert!(xml.contains(&format!("<OrderID><![CDATA[{}]]></OrderID>", o.id)));
    }
}
