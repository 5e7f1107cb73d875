//! User-facing chat messages
//!
//! Every string the agent shows the user comes from here, in the
//! conversation language. French is the default.

use std::fmt;
use std::str::FromStr;

use crate::category::Category;

/// Conversation language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    French,
    English,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::French => "fr",
            Locale::English => "en",
        }
    }
}

/// Error type for parsing Locale
#[derive(Debug)]
pub struct ParseLocaleError(String);

impl fmt::Display for ParseLocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseLocaleError {}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" | "french" | "français" | "francais" => Ok(Locale::French),
            "en" | "english" => Ok(Locale::English),
            other => Err(ParseLocaleError(format!(
                "Unknown locale '{}'. Valid values: fr, en",
                other
            ))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Message catalog for one locale
#[derive(Debug, Clone, Copy, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Placeholder for a missing or empty field
    pub fn not_defined(&self) -> &'static str {
        match self.locale {
            Locale::French => "Non défini",
            Locale::English => "Not defined",
        }
    }

    pub fn category_list(&self, names: &[&str]) -> String {
        if names.is_empty() {
            return self.no_categories();
        }
        let header = match self.locale {
            Locale::French => "Voici les catégories disponibles :",
            Locale::English => "Here are the available categories:",
        };
        let bullets: Vec<String> = names.iter().map(|n| format!("- {}", n)).collect();
        format!("{}\n{}", header, bullets.join("\n"))
    }

    pub fn no_categories(&self) -> String {
        match self.locale {
            Locale::French => "Aucune catégorie trouvée.".to_string(),
            Locale::English => "No categories found.".to_string(),
        }
    }

    pub fn ask_category_name(&self) -> String {
        match self.locale {
            Locale::French => "Veuillez préciser le nom de la catégorie.".to_string(),
            Locale::English => "Please specify the category name.".to_string(),
        }
    }

    /// Full metadata listing. Missing fields get the placeholder.
    pub fn category_metadata(&self, category: &Category) -> String {
        let (header, labels) = match self.locale {
            Locale::French => (
                format!("Métadonnées de la catégorie \"{}\" :", category.name),
                [
                    "Description",
                    "Slug",
                    "Titre SEO",
                    "Méta description",
                    "Requête cible",
                ],
            ),
            Locale::English => (
                format!("Metadata for category \"{}\":", category.name),
                [
                    "Description",
                    "Slug",
                    "SEO title",
                    "Meta description",
                    "Focus keyphrase",
                ],
            ),
        };
        let seo = &category.seo;
        let rows = [
            (labels[0], Some(category.description.as_str())),
            (labels[1], Some(category.slug.as_str())),
            (labels[2], seo.title.as_deref()),
            (labels[3], seo.meta_description.as_deref()),
            (labels[4], seo.focus_keyphrase.as_deref()),
        ];

        let mut out = header;
        for (label, value) in rows {
            out.push_str(&format!("\n- {} : {}", label, self.or_placeholder(value)));
        }
        out
    }

    pub fn suggestions(&self, query: &str, names: &[&str]) -> String {
        let bullets: Vec<String> = names.iter().map(|n| format!("- {}", n)).collect();
        match self.locale {
            Locale::French => format!(
                "Je n'ai pas trouvé la catégorie \"{}\" exactement. Vouliez-vous dire :\n{}\nMerci de confirmer le nom de la catégorie.",
                query,
                bullets.join("\n")
            ),
            Locale::English => format!(
                "I couldn't find the category \"{}\" exactly. Did you mean:\n{}\nPlease confirm the category name.",
                query,
                bullets.join("\n")
            ),
        }
    }

    pub fn not_found(&self, query: &str) -> String {
        match self.locale {
            Locale::French => format!("Catégorie \"{}\" introuvable.", query),
            Locale::English => format!("Category \"{}\" not found.", query),
        }
    }

    pub fn nothing_to_change(&self, name: &str) -> String {
        match self.locale {
            Locale::French => format!(
                "Aucune modification à appliquer à la catégorie \"{}\".",
                name
            ),
            Locale::English => format!("Nothing to change for category \"{}\".", name),
        }
    }

    pub fn update_succeeded(&self, name: &str) -> String {
        match self.locale {
            Locale::French => format!("La catégorie \"{}\" a été mise à jour avec succès.", name),
            Locale::English => format!("Category \"{}\" was updated successfully.", name),
        }
    }

    pub fn update_failed(&self, name: &str) -> String {
        match self.locale {
            Locale::French => format!(
                "Désolé, la mise à jour de la catégorie \"{}\" a échoué.",
                name
            ),
            Locale::English => format!("Sorry, updating category \"{}\" failed.", name),
        }
    }

    pub fn meta_description_copied(&self, name: &str) -> String {
        match self.locale {
            Locale::French => format!(
                "La méta description de la catégorie \"{}\" a été copiée dans sa description.",
                name
            ),
            Locale::English => format!(
                "The meta description of category \"{}\" was copied into its description.",
                name
            ),
        }
    }

    pub fn no_meta_description(&self, name: &str) -> String {
        match self.locale {
            Locale::French => format!(
                "La catégorie \"{}\" n'a pas de méta description à copier.",
                name
            ),
            Locale::English => format!(
                "Category \"{}\" has no meta description to copy.",
                name
            ),
        }
    }

    /// Generic apology for backend read failures
    pub fn connection_apology(&self) -> String {
        match self.locale {
            Locale::French => "Désolé, une erreur est survenue lors de la communication avec le site. Veuillez réessayer.".to_string(),
            Locale::English => "Sorry, something went wrong while contacting the site. Please try again.".to_string(),
        }
    }

    /// Generic apology when the language model could not be reached
    pub fn assistant_unavailable(&self) -> String {
        match self.locale {
            Locale::French => "Désolé, je n'ai pas pu traiter votre demande. Veuillez réessayer.".to_string(),
            Locale::English => "Sorry, I couldn't process your request. Please try again.".to_string(),
        }
    }

    fn or_placeholder<'a>(&self, value: Option<&'a str>) -> &'a str {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => self.not_defined(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::SeoMeta;

    #[test]
    fn test_locale_from_str() {
        assert_eq!("fr".parse::<Locale>().unwrap(), Locale::French);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::English);
        assert!("de".parse::<Locale>().is_err());
        assert_eq!(Locale::default(), Locale::French);
    }

    #[test]
    fn test_empty_list_never_renders_bullets() {
        let messages = Messages::new(Locale::English);
        assert_eq!(messages.category_list(&[]), "No categories found.");
    }

    #[test]
    fn test_list_is_bulleted() {
        let messages = Messages::new(Locale::English);
        let text = messages.category_list(&["Shoes", "Shirts"]);
        assert_eq!(
            text,
            "Here are the available categories:\n- Shoes\n- Shirts"
        );
    }

    #[test]
    fn test_metadata_placeholders() {
        let category = Category::new(1, "Shoes", "shoes").with_seo(SeoMeta {
            title: Some("Shoes | Shop".to_string()),
            meta_description: Some("   ".to_string()),
            focus_keyphrase: None,
        });

        let fr = Messages::new(Locale::French).category_metadata(&category);
        assert!(fr.starts_with("Métadonnées de la catégorie \"Shoes\" :"));
        assert!(fr.contains("- Description : Non défini"));
        assert!(fr.contains("- Titre SEO : Shoes | Shop"));
        assert!(fr.contains("- Méta description : Non défini"));
        assert!(fr.contains("- Requête cible : Non défini"));

        let en = Messages::new(Locale::English).category_metadata(&category);
        assert!(en.starts_with("Metadata for category \"Shoes\":"));
        assert!(en.contains("- Slug : shoes"));
        assert!(en.contains("- Focus keyphrase : Not defined"));
    }
}
