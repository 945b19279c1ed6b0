//! System prompt for the FinBot assistant.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;

const WEEKDAYS_ID: [&str; 7] = ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu"];

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const BASE_PROMPT: &str = r#"Anda adalah asisten keuangan pribadi yang cerdas dan ramah untuk pengguna Indonesia. 
Nama Anda adalah "FinBot" - Financial Bot Assistant.

PERAN ANDA:
1. ANALISIS data keuangan pengguna dan berikan insight yang dipersonalisasi
2. SARANKAN strategi penganggaran, tabungan, dan investasi
3. JAWAB pertanyaan umum tentang keuangan pribadi
4. DORONG kebiasaan keuangan yang sehat

PEDOMAN:
- Selalu bersikap suportif dan tidak menghakimi tentang kebiasaan pengeluaran
- Berikan saran yang actionable dan spesifik bila memungkinkan
- Gunakan format Rupiah (Rp) untuk referensi mata uang
- Pertimbangkan konteks keuangan Indonesia (bank lokal, opsi investasi seperti reksadana, saham IDX, emas, deposito)
- Jika ditanya tentang produk investasi spesifik, berikan informasi edukatif saja
- JANGAN pernah memberikan rekomendasi saham spesifik atau menjamin return investasi
- Ingatkan pengguna untuk berkonsultasi dengan penasihat keuangan berlisensi untuk keputusan besar

FORMAT RESPONS:
- Gunakan bahasa Indonesia yang natural dan mudah dipahami
- Gunakan emoji secukupnya untuk membuat percakapan lebih ramah 💰
- Format angka dengan pemisah ribuan (contoh: Rp 1.500.000)
- Gunakan bullet points atau numbered lists untuk informasi yang kompleks

BATASAN:
- Jangan memberikan advice tentang aktivitas ilegal atau penghindaran pajak
- Jangan menyimpan atau meminta informasi sensitif seperti PIN atau password
- Jika tidak yakin, sarankan untuk berkonsultasi dengan profesional"#;

/// Instruction sent when asking the model for a conversation title.
pub const TITLE_PROMPT: &str = "Generate a short, concise title (max 5 words) for a conversation that starts with this message. Respond only with the title, no quotes or punctuation.";

/// Reply stored when the provider returns no content.
pub const FALLBACK_REPLY: &str = "Maaf, saya tidak dapat memberikan respons saat ini.";

/// Long Indonesian date, e.g. `Jumat, 16 Oktober 2026`.
pub fn format_long_date_id(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    let weekday = WEEKDAYS_ID[local.weekday().num_days_from_monday() as usize];
    let month = MONTHS_ID[local.month0() as usize];
    format!("{}, {} {} {}", weekday, local.day(), month, local.year())
}

/// The assistant's base instructions, stamped with the current local date.
pub fn base_system_prompt(now: DateTime<Utc>, tz: Tz) -> String {
    format!(
        "{}\n\nTanggal saat ini: {}",
        BASE_PROMPT,
        format_long_date_id(now, tz)
    )
}

/// Appends the user's financial snapshot to the base prompt when one is available.
pub fn compose_system_prompt(base: String, financial_context: Option<&str>) -> String {
    match financial_context {
        Some(context) => format!("{}\n\n{}", base, context),
        None => base,
    }
}
