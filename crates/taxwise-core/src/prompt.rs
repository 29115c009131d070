//! Prompt construction for the advisor call.
//!
//! The prompt carries the profile, the rate schedule and relief table as
//! reference material, and a strict output format that the delimited
//! extractor recognises.

use taxwise_db::models::{EmploymentType, PlanType};

use crate::request::PlanRequest;
use crate::tax::rates::SCHEDULE;
use crate::tax::reliefs::reference_text;

/// Output contract included verbatim in every prompt.
const OUTPUT_FORMAT: &str = r#"## Output format

Give between 5 and 8 suggestions. Write each one as a block of exactly three
lines, separated from the next block by a blank line:

Category: <relief category, e.g. Lifestyle Relief>
Suggestion: <one or two sentences of concrete advice>
Potential Savings: RM <amount>

Amounts are the estimated reduction in tax payable, not the deduction itself.
No single amount may exceed 30% of the income. Finish with one line:

Total Savings: RM <sum of the amounts above>
"#;

fn employment_label(employment_type: EmploymentType) -> &'static str {
    match employment_type {
        EmploymentType::Employee => "salaried employee",
        EmploymentType::SelfEmployed => "self-employed individual",
    }
}

fn focus(plan_type: PlanType) -> &'static str {
    match plan_type {
        PlanType::Standard => {
            "Focus on reliefs and deductions that can still be claimed for the current year of assessment."
        }
        PlanType::Future => {
            "Focus on longer-term moves such as retirement schemes, education savings and investments \
             that keep reducing tax in the coming years."
        }
        PlanType::Business => {
            "Focus on business deductions, capital allowances and whether a different business \
             structure would lower the overall tax burden."
        }
    }
}

/// Build the advisor prompt for a request.
pub fn build_prompt(request: &PlanRequest) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str("# Malaysian personal tax saving plan\n\n");
    prompt.push_str(
        "You are a tax advisor for Malaysian residents. Suggest practical, legal ways \
         to reduce income tax for the person described below.\n\n",
    );

    prompt.push_str("## Profile\n\n");
    prompt.push_str(&format!(
        "- **Annual income:** RM {:.2}\n",
        request.assessment_income()
    ));
    prompt.push_str(&format!(
        "- **Employment:** {}\n",
        employment_label(request.employment_type)
    ));
    prompt.push_str(&format!("- **Plan type:** {}\n\n", request.plan_type));
    prompt.push_str(focus(request.plan_type));
    prompt.push_str("\n\n");

    prompt.push_str("## Income tax rates\n\n");
    prompt.push_str(&SCHEDULE.reference_table());
    prompt.push('\n');

    prompt.push_str("## Relief categories\n\n");
    prompt.push_str(&reference_text());
    prompt.push('\n');

    prompt.push_str(OUTPUT_FORMAT);

    prompt
}
