use crate::error::SchemaError;
use crate::schema::FormSpec;

const FORMS_JSON: &str = include_str!("forms.json");

/// The stock insurance forms: health, home and car applications.
pub fn demo_forms() -> Result<Vec<FormSpec>, SchemaError> {
    FormSpec::list_from_json(FORMS_JSON)
}

/// States or regions of the countries the stock forms offer. Unknown countries have none.
pub fn states_for(country: &str) -> Vec<String> {
    let states: &[&str] = match country {
        "USA" => &["California", "New York", "Texas", "Florida", "Illinois"],
        "Canada" => &["Ontario", "Quebec", "British Columbia", "Alberta"],
        "Germany" => &["Bavaria", "North Rhine-Westphalia", "Berlin", "Hamburg"],
        "France" => &[
            "Île-de-France",
            "Provence-Alpes-Côte d'Azur",
            "Auvergne-Rhône-Alpes",
        ],
        _ => &[],
    };
    states.iter().map(|s| s.to_string()).collect()
}

/// Short name of the insurance line a form belongs to, as the listing shows it.
pub fn insurance_type(form_id: &str) -> &'static str {
    match form_id {
        "health_insurance_application" => "Health",
        "home_insurance_application" => "Home",
        "car_insurance_application" => "Car",
        _ => "Unknown",
    }
}

/// One-line description shown next to a form in the picker.
pub fn form_description(form_id: &str) -> &'static str {
    match form_id {
        "health_insurance_application" => {
            "Comprehensive health coverage application with medical history and personal information."
        }
        "home_insurance_application" => {
            "Property protection application including home value, security systems, and safety measures."
        }
        "car_insurance_application" => {
            "Vehicle insurance application covering driving history, vehicle details, and coverage options."
        }
        _ => "Insurance application form.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_parses() {
        let forms = demo_forms().unwrap();
        let ids: Vec<_> = forms.iter().map(|f| f.form_id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "health_insurance_application",
                "home_insurance_application",
                "car_insurance_application"
            ]
        );
        assert_eq!(forms[0].section_count(), 3);
    }

    #[test]
    fn states_by_country() {
        assert_eq!(states_for("Canada").len(), 4);
        assert!(states_for("Atlantis").is_empty());
    }
}
