//! Prompt templates for field extraction and report generation.
//!
//! Both system prompts are part of the output contract: the eleven numbered
//! questions define what the extraction reply contains, and the four report
//! headers are what [`crate::sections`] keys on to split the generated
//! report. Change them only together with the parser and the renderers.

use crate::model::ExtractedInformation;

/// System prompt for per-chunk field extraction.
pub const EXTRACTION_PROMPT: &str = r#"You are an expert business analyst. Extract the following information from the executive summary.
If information is not available, clearly state "Information not provided in the document."

Questions to answer:
1. What is the company name?
2. Technology type (Device, diagnostic, therapeutic, or digital health)
3. What is the need addressed by the product?
4. How large is the potential market?
5. Was that potential calculated "top down" or "bottom up"?
6. How developed is the product? (concept only, prototype, in testing, or available on the market)
7. If it is on the market, what is the current level of sales?
8. What is the range of the potential value that the company might realize upon exit?
9. How many years to that exit?
10. How much money must be invested to secure that exit?
11. What skills needed to execute the plan are missing from the management team?

Provide your response in JSON format with the following keys:
- company_name
- technology_type
- need_addressed
- market_size
- market_calculation_method
- product_development_stage
- current_sales
- exit_value_range
- years_to_exit
- investment_needed
- missing_skills

Also include a confidence_score (0-1) for each field indicating how confident you are in the extraction."#;

/// System prompt for report generation from the merged fields.
pub const REPORT_PROMPT: &str = r#"Based on the extracted information, create a professional investment analysis report.
Use the following headers and create comprehensive paragraphs for each section:

1. Nature and state of the product
2. Market Need and Size
3. Elements of potential ROI
4. Strength of the Management Team

Make the report professional, analytical, and suitable for investors.
If information is missing, acknowledge it professionally."#;

/// User message carrying one chunk of the document.
pub fn extraction_message(chunk: &str) -> String {
    format!("Executive Summary:\n{chunk}")
}

/// Human-readable dump of the merged fields, sent as the report request.
pub fn report_message(info: &ExtractedInformation) -> String {
    let f = &info.fields;
    format!(
        "Company: {}\n\
         Technology Type: {}\n\
         Need Addressed: {}\n\
         Market Size: {}\n\
         Market Calculation: {}\n\
         Development Stage: {}\n\
         Current Sales: {}\n\
         Exit Value: {}\n\
         Years to Exit: {}\n\
         Investment Needed: {}\n\
         Missing Skills: {}",
        f.company_name,
        f.technology_type,
        f.need_addressed,
        f.market_size,
        f.market_calculation_method,
        f.product_development_stage,
        f.current_sales,
        f.exit_value_range,
        f.years_to_exit,
        f.investment_needed,
        f.missing_skills,
    )
}
