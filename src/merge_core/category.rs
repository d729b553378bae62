//! Conversion categories pivoted into fixed output columns

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionCategory {
    GetEstimate,
    WhatsappButtonClick,
    BeginBooking,
    SubmitBooking,
}

impl ConversionCategory {
    /// Number of category columns in the merged table
    pub const COUNT: usize = 4;

    pub fn as_tag(&self) -> &'static str {
        match self {
            ConversionCategory::GetEstimate => "GetEstimate",
            ConversionCategory::WhatsappButtonClick => "WhatsappButtonClick",
            ConversionCategory::BeginBooking => "BeginBooking",
            ConversionCategory::SubmitBooking => "SubmitBooking",
        }
    }

    /// Conversion type name as it appears in the ads report
    pub fn report_label(&self) -> &'static str {
        match self {
            ConversionCategory::GetEstimate => "Google Ads Conversion - Get Estimate",
            ConversionCategory::WhatsappButtonClick => "Whatsapp Button Click",
            ConversionCategory::BeginBooking => "Google Ads Conversion - Begin Booking",
            ConversionCategory::SubmitBooking => {
                "Google Ads Conversion - Submit Booking (Thank you Page)"
            }
        }
    }

    pub fn column_header(&self) -> &'static str {
        match self {
            ConversionCategory::GetEstimate => "Get Estimate",
            ConversionCategory::WhatsappButtonClick => "Whatsapp Button Click",
            ConversionCategory::BeginBooking => "Begin Booking",
            ConversionCategory::SubmitBooking => "Submit Booking",
        }
    }

    /// Position of this category's counter among the category columns
    pub fn column_index(&self) -> usize {
        match self {
            ConversionCategory::GetEstimate => 0,
            ConversionCategory::WhatsappButtonClick => 1,
            ConversionCategory::BeginBooking => 2,
            ConversionCategory::SubmitBooking => 3,
        }
    }

    /// Exact match on the canonical tag. Anything else is unknown.
    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "GetEstimate" => Some(ConversionCategory::GetEstimate),
            "WhatsappButtonClick" => Some(ConversionCategory::WhatsappButtonClick),
            "BeginBooking" => Some(ConversionCategory::BeginBooking),
            "SubmitBooking" => Some(ConversionCategory::SubmitBooking),
            _ => None,
        }
    }

    /// Accepts either a canonical tag or the raw report label
    pub fn from_report_label(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::from_tag(trimmed).or_else(|| {
            Self::all()
                .into_iter()
                .find(|category| category.report_label() == trimmed)
        })
    }

    pub fn all() -> [ConversionCategory; 4] {
        [
            ConversionCategory::GetEstimate,
            ConversionCategory::WhatsappButtonClick,
            ConversionCategory::BeginBooking,
            ConversionCategory::SubmitBooking,
        ]
    }
}
