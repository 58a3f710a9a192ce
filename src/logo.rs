//! Supplier logo lookup.
//!
//! Logos live as static files under `/images/suppliers/`. A supplier name is
//! reduced to a key (ASCII lowercase, alphanumerics only) and looked up:
//!
//! 1. the whole key against the logo file keys, then against the aliases;
//! 2. each word of the name, in order, the same way.
//!
//! No hit means the UI renders its generic supplier icon.

pub const LOGO_URL_PREFIX: &str = "/images/suppliers/";

const LOGO_FILES: &[&str] = &[
    "FARCOM.jpg", "SARDES_FILTRE.jpg", "FRAP.jpg", "UCEL.jpg", "GIF.jpg", "ISAM.jpg", "BGF.jpg",
    "MTA.jpg", "RUVILLE.jpg", "ZEN.jpg", "KLAS.jpg", "WUNDER.jpg", "FACET.jpg", "AUTOGAMMA.jpg",
    "CHAMPION.jpg", "sonax.jpg", "EXO.jpg", "SHELL.jpg", "OCAP_GROUPE.jpg", "drive.jpg",
    "VIKA.jpg", "VALEO.jpg", "SASIC.jpg", "TRW.jpg", "MFILTRE.jpg", "VICTOR_REINZ.jpg",
    "SELENIA.jpg", "GM.jpg", "NGK.jpg", "VAGMAX.jpg", "CASTROL.jpg", "NE.jpg", "TRICLO.jpg",
    "MANDO.jpg", "MOTUL.jpg", "KAVO.jpg", "VARTA.jpg", "FTE.jpg", "FEBI_BILSTEIN.jpg", "3RG.jpg",
    "BOSCH.jpg", "MISFAT.jpg", "ELF.jpg", "filtron.jpg", "TOTAL.jpg", "LPR.jpg", "TOPRAN.jpg",
    "VERNET.jpg", "LUCAS.jpg", "LIQUI_MOLY.jpg", "GATES.jpg", "YACCO.jpg", "VIF.jpg", "UFI.jpg",
    "VM.jpg", "TYC.jpg", "TEKNOROT.jpg", "SIAMM.jpg", "SKF.jpg", "TALOSA.jpg", "STC.jpg",
    "SVAC.jpg", "SNR.jpg", "SIDAT.jpg", "RTS.jpg", "RODRUNNER.jpg", "SACHS.jpg", "RIDEX.jpg",
    "RECORD FRANCE.jpg", "PSA.jpg", "PLEKSAN.jpg", "PRO_MAX.jpg", "PRASCO.jpg", "PIERBURG.jpg",
    "OPTIMAL.jpg", "PHILIPS.jpg", "OCEANA.jpg", "OSSCA.jpg", "NSK.jpg", "NPR.jpg", "NRF.jpg",
    "MS_GERMANY.jpg", "NARVA.jpg", "MONROE.jpg", "MOOG.jpg", "MULTISPARK.jpg", "MOTRIO.jpg",
    "METELLI.jpg", "MECARM.jpg", "METALCAUCHO.jpg", "MECAFILTER.jpg", "MEAT & DORIA.jpg",
    "Maysan_mando.jpg", "MCB_BEARINGS.jpg", "MCAR.jpg", "MARS.jpg", "MASTER.jpg", "MARILIA.jpg",
];

/// Partial names that identify a multi-word brand.
const ALIASES: &[(&str, &str)] = &[
    ("febi", "FEBI_BILSTEIN.jpg"),
    ("bilstein", "FEBI_BILSTEIN.jpg"),
    ("record", "RECORD FRANCE.jpg"),
    ("meat", "MEAT & DORIA.jpg"),
    ("doria", "MEAT & DORIA.jpg"),
    ("liqui", "LIQUI_MOLY.jpg"),
    ("moly", "LIQUI_MOLY.jpg"),
    ("victor", "VICTOR_REINZ.jpg"),
    ("reinz", "VICTOR_REINZ.jpg"),
    ("maysan", "Maysan_mando.jpg"),
    ("mcb", "MCB_BEARINGS.jpg"),
    ("ocap", "OCAP_GROUPE.jpg"),
    ("sardes", "SARDES_FILTRE.jpg"),
    ("promax", "PRO_MAX.jpg"),
];

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn file_key(file: &str) -> String {
    normalize(file.strip_suffix(".jpg").unwrap_or(file))
}

fn lookup_key(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        return None;
    }
    if let Some(file) = LOGO_FILES.iter().copied().find(|f| file_key(f) == key) {
        return Some(file);
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, file)| *file)
}

/// Logo file name for a supplier, if one is known.
pub fn find_logo(supplier_name: &str) -> Option<&'static str> {
    if let Some(file) = lookup_key(&normalize(supplier_name)) {
        return Some(file);
    }
    supplier_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(normalize)
        .find_map(|word| lookup_key(&word))
}

/// Public URL path of the supplier's logo, if one is known.
pub fn logo_path(supplier_name: &str) -> Option<String> {
    find_logo(supplier_name).map(|file| {
        format!(
            "{}{}",
            LOGO_URL_PREFIX,
            file.replace('&', "%26").replace(' ', "%20")
        )
    })
}
