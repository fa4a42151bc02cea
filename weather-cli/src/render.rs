use weather_core::{Attribute, Element, RenderTarget, Surface};

/// Terminal rendition of the weather card.
///
/// Element state lives in a [`Surface`]; every flush repaints the card if the
/// visible frame changed.
#[derive(Debug, Default)]
pub struct TerminalCard {
    surface: Surface,
    last_frame: Option<String>,
}

impl TerminalCard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderTarget for TerminalCard {
    fn set_text(&mut self, element: Element, text: &str) {
        self.surface.set_text(element, text);
    }

    fn set_attribute(&mut self, element: Element, attribute: Attribute, value: &str) {
        self.surface.set_attribute(element, attribute, value);
    }

    fn set_visible(&mut self, element: Element, visible: bool) {
        self.surface.set_visible(element, visible);
    }

    fn flush(&mut self) {
        let frame = render_frame(&self.surface);
        if self.last_frame.as_deref() != Some(frame.as_str()) {
            println!("{frame}\n");
            self.last_frame = Some(frame);
        }
    }
}

/// Text for whatever the surface currently shows.
pub fn render_frame(surface: &Surface) -> String {
    let text = move |el: Element| surface.text(el).unwrap_or_default();

    if surface.is_visible(Element::Loader) {
        return "Loading weather...".to_string();
    }

    if surface.is_visible(Element::ErrorMessage) {
        return format!("error: {}", text(Element::ErrorMessage));
    }

    if surface.is_visible(Element::WeatherCard) {
        let icon = surface.attribute(Element::WeatherIcon, Attribute::Src).unwrap_or_default();
        return format!(
            "{}\n{}\n{}°C  {}\nHumidity {}  ·  Wind {}\nIcon {}",
            text(Element::CityName),
            text(Element::DateTime),
            text(Element::Temperature),
            text(Element::Condition),
            text(Element::Humidity),
            text(Element::WindSpeed),
            icon,
        );
    }

    "Type a city name and press Enter.".to_string()
}
