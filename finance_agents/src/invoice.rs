//! Invoice agent: payment status and vendor concentration

use crate::datasets::{flexible_bool, load_or_fallback, read_csv, Loaded};
use crate::{AgentKind, AgentResponse, FinanceAgent, Result};
use fin_math::SummaryStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

const TOP_VENDORS: usize = 5;

/// One invoice row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: String,
    pub vendor: String,
    pub amount: f64,
    pub status: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_overdue: bool,
    #[serde(default)]
    pub payment_terms: Option<String>,
}

impl Invoice {
    fn has_status(&self, status: &str) -> bool {
        self.status.trim().eq_ignore_ascii_case(status)
    }
}

pub fn fallback_invoices() -> Vec<Invoice> {
    vec![
        Invoice {
            invoice_id: "INV_001".to_string(),
            vendor: "Vendor A".to_string(),
            amount: 1000.0,
            status: "pending".to_string(),
            is_overdue: false,
            payment_terms: None,
        },
        Invoice {
            invoice_id: "INV_002".to_string(),
            vendor: "Vendor B".to_string(),
            amount: 2000.0,
            status: "paid".to_string(),
            is_overdue: false,
            payment_terms: None,
        },
    ]
}

fn count_and_sum(invoices: &[Invoice], pred: impl Fn(&Invoice) -> bool) -> (usize, f64) {
    invoices
        .iter()
        .filter(|inv| pred(inv))
        .fold((0, 0.0), |(n, total), inv| (n + 1, total + inv.amount))
}

/// Per-vendor totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorTotal {
    pub vendor: String,
    pub total_amount: f64,
    pub invoice_count: usize,
    pub pending_count: usize,
}

/// Invoice statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceReport {
    pub total_invoices: usize,
    pub total_amount: f64,
    /// Amount statistics; `None` when there are no invoices
    pub amount_stats: Option<SummaryStats>,
    pub paid_count: usize,
    pub paid_amount: f64,
    pub pending_count: usize,
    pub pending_amount: f64,
    pub overdue_count: usize,
    pub overdue_amount: f64,
    /// Largest vendors by amount
    pub top_vendors: Vec<VendorTotal>,
    /// Invoices per payment term, most common first
    pub payment_terms: Vec<(String, usize)>,
}

impl InvoiceReport {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let (paid_count, paid_amount) = count_and_sum(invoices, |inv| inv.has_status("paid"));
        let (pending_count, pending_amount) =
            count_and_sum(invoices, |inv| inv.has_status("pending"));
        let (overdue_count, overdue_amount) = count_and_sum(invoices, |inv| inv.is_overdue);

        let mut vendors: HashMap<&str, VendorTotal> = HashMap::new();
        for inv in invoices {
            let entry = vendors.entry(inv.vendor.as_str()).or_insert_with(|| VendorTotal {
                vendor: inv.vendor.clone(),
                total_amount: 0.0,
                invoice_count: 0,
                pending_count: 0,
            });
            entry.total_amount += inv.amount;
            entry.invoice_count += 1;
            if inv.has_status("pending") {
                entry.pending_count += 1;
            }
        }
        let mut top_vendors: Vec<VendorTotal> = vendors.into_values().collect();
        top_vendors.sort_by(|a, b| {
            b.total_amount
                .total_cmp(&a.total_amount)
                .then_with(|| a.vendor.cmp(&b.vendor))
        });
        top_vendors.truncate(TOP_VENDORS);

        let mut terms: HashMap<&str, usize> = HashMap::new();
        for term in invoices.iter().filter_map(|inv| inv.payment_terms.as_deref()) {
            *terms.entry(term).or_insert(0) += 1;
        }
        let mut payment_terms: Vec<(String, usize)> = terms
            .into_iter()
            .map(|(term, count)| (term.to_string(), count))
            .collect();
        payment_terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let amounts: Vec<f64> = invoices.iter().map(|inv| inv.amount).collect();
        let amount_stats = SummaryStats::from_values(&amounts).ok();

        Self {
            total_invoices: invoices.len(),
            total_amount: amount_stats.map_or(0.0, |s| s.sum),
            amount_stats,
            paid_count,
            paid_amount,
            pending_count,
            pending_amount,
            overdue_count,
            overdue_amount,
            top_vendors,
            payment_terms,
        }
    }

    pub fn average_amount(&self) -> f64 {
        self.amount_stats.map_or(0.0, |s| s.mean)
    }

    pub fn insights(&self) -> Vec<String> {
        let mut insights = Vec::new();
        if self.overdue_count > 0 {
            insights.push(format!(
                "{} overdue invoices ({:.2})",
                self.overdue_count, self.overdue_amount
            ));
        }
        if self.total_amount > 0.0 && self.pending_amount > self.total_amount * 0.3 {
            insights.push(format!(
                "{:.1}% of invoice value is still unpaid",
                self.pending_amount / self.total_amount * 100.0
            ));
        }
        if self.average_amount() > 10_000.0 {
            insights.push("High average invoice amount: watch cash flow".to_string());
        }
        insights
    }
}

impl fmt::Display for InvoiceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_invoices == 0 {
            return write!(f, "No invoice data to analyse.");
        }

        writeln!(f, "Invoice overview:")?;
        writeln!(f, "- Total invoices: {}", self.total_invoices)?;
        writeln!(f, "- Paid: {} ({:.2})", self.paid_count, self.paid_amount)?;
        writeln!(
            f,
            "- Pending: {} ({:.2})",
            self.pending_count, self.pending_amount
        )?;
        writeln!(
            f,
            "- Overdue: {} ({:.2})",
            self.overdue_count, self.overdue_amount
        )?;
        if let Some(stats) = &self.amount_stats {
            writeln!(
                f,
                "- Average invoice: {:.2} (largest {:.2})",
                stats.mean, stats.max
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Top {} vendors by value:", TOP_VENDORS)?;
        for v in &self.top_vendors {
            writeln!(
                f,
                "- {}: {:.2} across {} invoices ({} pending)",
                v.vendor, v.total_amount, v.invoice_count, v.pending_count
            )?;
        }
        if !self.payment_terms.is_empty() {
            writeln!(f)?;
            writeln!(f, "Payment terms:")?;
            for (term, count) in &self.payment_terms {
                writeln!(f, "- {}: {}", term, count)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Insights:")?;
        let insights = self.insights();
        if insights.is_empty() {
            writeln!(f, "- All invoices are in good standing")?;
        }
        for insight in insights {
            writeln!(f, "- {}", insight)?;
        }
        Ok(())
    }
}

/// Summarises invoice status
#[derive(Debug, Clone)]
pub struct InvoiceAgent {
    path: PathBuf,
}

impl InvoiceAgent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Loaded<Vec<Invoice>> {
        load_or_fallback(&self.path, read_csv, fallback_invoices)
    }
}

impl FinanceAgent for InvoiceAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Invoice
    }

    fn handle(&mut self, _query: &str) -> Result<AgentResponse> {
        let invoices = self.load();
        let report = InvoiceReport::from_invoices(&invoices.data);
        Ok(AgentResponse::text(AgentKind::Invoice, report.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn invoice(id: &str, vendor: &str, amount: f64, status: &str, overdue: bool) -> Invoice {
        Invoice {
            invoice_id: id.to_string(),
            vendor: vendor.to_string(),
            amount,
            status: status.to_string(),
            is_overdue: overdue,
            payment_terms: Some("Net 30".to_string()),
        }
    }

    #[test]
    fn test_fallback_report() {
        let report = InvoiceReport::from_invoices(&fallback_invoices());
        assert_eq!(report.total_invoices, 2);
        assert_eq!(report.pending_count, 1);
        assert_eq!(report.paid_amount, 2000.0);
        assert_eq!(report.top_vendors[0].vendor, "Vendor B");
        // 1000 of 3000 is pending
        assert_eq!(report.insights(), vec!["33.3% of invoice value is still unpaid"]);
    }

    #[test]
    fn test_vendor_ranking_and_overdue() {
        let invoices: Vec<Invoice> = (0..8)
            .map(|i| {
                invoice(
                    &format!("INV_{:03}", i),
                    &format!("Vendor {}", i),
                    1000.0 * (i + 1) as f64,
                    if i % 2 == 0 { "paid" } else { "Pending" },
                    i == 7,
                )
            })
            .collect();

        let report = InvoiceReport::from_invoices(&invoices);
        let ranked: Vec<&str> = report.top_vendors.iter().map(|v| v.vendor.as_str()).collect();
        assert_eq!(
            ranked,
            vec!["Vendor 7", "Vendor 6", "Vendor 5", "Vendor 4", "Vendor 3"]
        );
        assert_eq!(report.overdue_count, 1);
        assert_eq!(report.overdue_amount, 8000.0);
        assert_eq!(report.pending_count, 4);
        assert_eq!(report.payment_terms, vec![("Net 30".to_string(), 8)]);
        assert!(report.to_string().contains("1 overdue invoices"));
    }

    #[test]
    fn test_empty_report() {
        let report = InvoiceReport::from_invoices(&[]);
        assert_eq!(report.to_string(), "No invoice data to analyse.");
    }
}
