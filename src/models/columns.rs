// Roster column names. The table header is written in `HEADER` order.

pub const ROLE: &str = "Role in EWC";
pub const GAME: &str = "Game";
pub const PURPOSE_OF_VISIT: &str = "Purpose of Visit";
pub const GIVEN_NAME: &str = "Given Name";
pub const LAST_NAME: &str = "Last Name";
pub const GENDER: &str = "Gender";
pub const DATE_OF_BIRTH: &str = "Date of Birth";
pub const PLACE_OF_BIRTH: &str = "Place of Birth";
pub const NATIONALITY: &str = "Nationality";
pub const ARRIVAL_DATE: &str = "Arrival Date";
pub const DEPARTURE_DATE: &str = "Departure Date";
pub const DEPARTURE_CITY: &str = "Departure City";
pub const DEPARTURE_AIRPORT: &str = "Departure Airport";
pub const DURATION_OF_STAY: &str = "Duration of Stay";
pub const ENTRY_TYPE: &str = "Entry Type [single, multiple]";
pub const RESIDENCE_ADDRESS: &str = "Address of Residence in KSA";
pub const PASSPORT_NUMBER: &str = "Passport Number";
pub const ISSUING_DATE: &str = "Passport Issuing Date";
pub const EXPIRY_DATE: &str = "Passport Expiry Date";
pub const ISSUANCE_CITY: &str = "Passport Issuance City";
pub const PASSPORT_TYPE: &str = "Passport Type";
pub const PHONE_NUMBER: &str = "Phone Number";
pub const EMAIL: &str = "Email";
pub const SCAN_ACCURACY: &str = "Scan Accuracy";
pub const FILE_NAME: &str = "File Name";
pub const FILE_PATH: &str = "File Path";
pub const MRZ1: &str = "MRZ1";
pub const MRZ2: &str = "MRZ2";

pub const HEADER: [&str; 28] = [
    ROLE,
    GAME,
    PURPOSE_OF_VISIT,
    GIVEN_NAME,
    LAST_NAME,
    GENDER,
    DATE_OF_BIRTH,
    PLACE_OF_BIRTH,
    NATIONALITY,
    ARRIVAL_DATE,
    DEPARTURE_DATE,
    DEPARTURE_CITY,
    DEPARTURE_AIRPORT,
    DURATION_OF_STAY,
    ENTRY_TYPE,
    RESIDENCE_ADDRESS,
    PASSPORT_NUMBER,
    ISSUING_DATE,
    EXPIRY_DATE,
    ISSUANCE_CITY,
    PASSPORT_TYPE,
    PHONE_NUMBER,
    EMAIL,
    SCAN_ACCURACY,
    FILE_NAME,
    FILE_PATH,
    MRZ1,
    MRZ2,
];

/// Curated travel columns copied from the uploaded manifest during a merge.
pub const MERGE_COLUMNS: [&str; 14] = [
    ROLE,
    GAME,
    PURPOSE_OF_VISIT,
    ARRIVAL_DATE,
    DEPARTURE_DATE,
    DEPARTURE_CITY,
    DEPARTURE_AIRPORT,
    DURATION_OF_STAY,
    ENTRY_TYPE,
    RESIDENCE_ADDRESS,
    ISSUANCE_CITY,
    PASSPORT_TYPE,
    PHONE_NUMBER,
    EMAIL,
];

pub const DEFAULT_PASSPORT_TYPE: &str = "Regular";
