use super::lead::LeadRecord;

pub const CSV_FILENAME: &str = "search_results.csv";
pub const CSV_HEADER: [&str; 6] = ["Title", "Source", "URL", "Emails", "First Name", "Last Name"];

const LINE_TERMINATOR: &str = "\r\n";

/// Renders leads as CSV with a fixed header row.
pub fn leads_to_csv(leads: &[LeadRecord]) -> String {
    let mut output = String::new();
    write_row(&mut output, CSV_HEADER);

    for lead in leads {
        let emails = lead.emails.join(", ");
        write_row(
            &mut output,
            [
                lead.title.as_str(),
                lead.source.as_str(),
                lead.url.as_str(),
                emails.as_str(),
                lead.first_name.as_str(),
                lead.last_name.as_str(),
            ],
        );
    }

    output
}

fn write_row<'a>(output: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        push_field(output, field);
    }
    output.push_str(LINE_TERMINATOR);
}

/// Quotes only when needed, doubling any embedded quote.
fn push_field(output: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        output.push('"');
        output.push_str(&field.replace('"', "\"\""));
        output.push('"');
    } else {
        output.push_str(field);
    }
}
