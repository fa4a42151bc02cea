//! Rendering targets for the weather card.
//!
//! The controller never talks to a concrete UI. It drives a [`RenderTarget`],
//! which only knows how to set text, set an attribute and show or hide an
//! element. [`Surface`] is the in-memory implementation used by the terminal
//! front-end and by tests.

use std::collections::{HashMap, HashSet};

/// Every element the card writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    CityInput,
    /// Busy indicator on the search button, shown while a fetch runs.
    SearchButtonLoader,
    Loader,
    ErrorMessage,
    WeatherCard,
    CityName,
    DateTime,
    WeatherIcon,
    Temperature,
    Condition,
    Humidity,
    WindSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Src,
    Alt,
}

/// Capability interface the controller renders through.
pub trait RenderTarget {
    fn set_text(&mut self, element: Element, text: &str);

    fn set_attribute(&mut self, element: Element, attribute: Attribute, value: &str);

    fn set_visible(&mut self, element: Element, visible: bool);

    /// Called once after each handled event. Front-ends that repaint do it here.
    fn flush(&mut self) {}
}

/// Element state kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    texts: HashMap<Element, String>,
    attributes: HashMap<(Element, Attribute), String>,
    visible: HashSet<Element>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, element: Element) -> Option<&str> {
        self.texts.get(&element).map(String::as_str)
    }

    pub fn attribute(&self, element: Element, attribute: Attribute) -> Option<&str> {
        self.attributes.get(&(element, attribute)).map(String::as_str)
    }

    pub fn is_visible(&self, element: Element) -> bool {
        self.visible.contains(&element)
    }
}

impl RenderTarget for Surface {
    fn set_text(&mut self, element: Element, text: &str) {
        self.texts.insert(element, text.to_string());
    }

    fn set_attribute(&mut self, element: Element, attribute: Attribute, value: &str) {
        self.attributes.insert((element, attribute), value.to_string());
    }

    fn set_visible(&mut self, element: Element, visible: bool) {
        if visible {
            self.visible.insert(element);
        } else {
            self.visible.remove(&element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_tracks_text_attributes_and_visibility() {
        let mut s = Surface::new();
        assert_eq!(s.text(Element::CityName), None);
        assert!(!s.is_visible(Element::WeatherCard));

        s.set_text(Element::CityName, "London, GB");
        s.set_attribute(Element::WeatherIcon, Attribute::Alt, "clear sky");
        s.set_visible(Element::WeatherCard, true);

        assert_eq!(s.text(Element::CityName), Some("London, GB"));
        assert_eq!(s.attribute(Element::WeatherIcon, Attribute::Alt), Some("clear sky"));
        assert_eq!(s.attribute(Element::WeatherIcon, Attribute::Src), None);
        assert!(s.is_visible(Element::WeatherCard));

        s.set_visible(Element::WeatherCard, false);
        s.set_visible(Element::WeatherCard, false);
        assert!(!s.is_visible(Element::WeatherCard));
    }
}
