//! Client locales and the availability mask used while overlaying strings.
use bitflags::bitflags;

/// Supported client locales, in client id order.
///
/// The display form (`enUS`, `koKR`, ...) is also the name of the
/// subdirectory holding that locale's string overlays.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Locale {
    #[default]
    #[strum(to_string = "enUS")]
    EnUs = 0,
    #[strum(to_string = "koKR")]
    KoKr = 1,
    #[strum(to_string = "frFR")]
    FrFr = 2,
    #[strum(to_string = "deDE")]
    DeDe = 3,
    #[strum(to_string = "zhCN")]
    ZhCn = 4,
    #[strum(to_string = "zhTW")]
    ZhTw = 5,
    #[strum(to_string = "esES")]
    EsEs = 6,
    #[strum(to_string = "esMX")]
    EsMx = 7,
    #[strum(to_string = "ruRU")]
    RuRu = 8,
    #[strum(to_string = "ptPT")]
    PtPt = 9,
    #[strum(to_string = "itIT")]
    ItIt = 10,
}

impl Locale {
    /// Number of known locales.
    pub const TOTAL: usize = <Self as strum::EnumCount>::COUNT;

    /// Returns the numeric client id of this locale.
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a locale by its numeric client id.
    pub fn from_id(id: u8) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|locale| locale.id() == id)
    }

    /// Client name, e.g. `"enUS"`. Also the overlay subdirectory name.
    pub fn name(&self) -> &str {
        self.as_ref()
    }

    /// Iterates over every known locale in id order.
    pub fn all() -> impl Iterator<Item = Locale> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

bitflags! {
    /// Set of locales whose string overlays are still worth attempting.
    ///
    /// Bit `n` corresponds to the locale with client id `n`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LocaleMask: u16 {
        const EN_US = 1 << 0;
        const KO_KR = 1 << 1;
        const FR_FR = 1 << 2;
        const DE_DE = 1 << 3;
        const ZH_CN = 1 << 4;
        const ZH_TW = 1 << 5;
        const ES_ES = 1 << 6;
        const ES_MX = 1 << 7;
        const RU_RU = 1 << 8;
        const PT_PT = 1 << 9;
        const IT_IT = 1 << 10;
    }
}

impl LocaleMask {
    /// Mask holding exactly one locale.
    pub const fn of(locale: Locale) -> Self {
        Self::from_bits_retain(1 << locale.id())
    }

    pub fn has(self, locale: Locale) -> bool {
        self.contains(Self::of(locale))
    }

    /// Iterates over the locales present in this mask, in id order.
    pub fn locales(self) -> impl Iterator<Item = Locale> {
        Locale::all().filter(move |locale| self.has(*locale))
    }
}

impl Default for LocaleMask {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Locale> for LocaleMask {
    fn from(locale: Locale) -> Self {
        Self::of(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_locale_names_round_trip() {
        assert_eq!(Locale::EnUs.to_string(), "enUS");
        assert_eq!(Locale::ZhTw.name(), "zhTW");
        assert_eq!(Locale::from_str("ruRU").unwrap(), Locale::RuRu);
        assert_eq!(Locale::from_str("dede").unwrap(), Locale::DeDe);
        assert!(Locale::from_str("xxXX").is_err());
    }

    #[test]
    fn test_locale_ids_are_dense() {
        assert_eq!(Locale::TOTAL, 11);
        for (index, locale) in Locale::all().enumerate() {
            assert_eq!(locale.id() as usize, index);
            assert_eq!(Locale::from_id(locale.id()), Some(locale));
        }
        assert_eq!(Locale::from_id(11), None);
    }

    #[test]
    fn test_mask_covers_every_locale() {
        let mask = LocaleMask::all();
        assert_eq!(mask.locales().count(), Locale::TOTAL);
        assert!(Locale::all().all(|locale| mask.has(locale)));
    }

    #[test]
    fn test_mask_remove_single_locale() {
        let mut mask = LocaleMask::default();
        mask.remove(LocaleMask::of(Locale::FrFr));
        assert!(!mask.has(Locale::FrFr));
        assert!(mask.has(Locale::DeDe));
        assert_eq!(mask.locales().count(), Locale::TOTAL - 1);
    }
}
