use serde_json::{Value, json};

/// Region name with a rough centre and spread in degrees.
const REGIONS: [(&str, f64, f64, f64); 6] = [
    ("臺北市", 25.05, 121.54, 0.05),
    ("新北市", 25.01, 121.46, 0.12),
    ("桃園市", 24.96, 121.25, 0.10),
    ("臺中市", 24.15, 120.67, 0.10),
    ("臺南市", 23.00, 120.21, 0.10),
    ("高雄市", 22.63, 120.31, 0.10),
];

const SCALE_BRANDS: [&str; 4] = ["AND", "CAS", "Tanita", "DIGI"];
const BRIDGE_BRANDS: [&str; 3] = ["Mettler Toledo", "Rice Lake", "Avery"];
const OWNERS: [&str; 4] = ["大成砂石", "永豐廢料", "順發物流", "全興預拌"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    /// Point scattered uniformly around a centre.
    fn around(&mut self, centre: f64, spread: f64) -> f64 {
        let offset = (self.next_f64() * 2.0 - 1.0) * spread;
        ((centre + offset) * 1e5).round() / 1e5
    }
}

/// Inspection flag as it shows up in the wild: mostly clean, sometimes
/// padded or lower-case.
fn compliance_flag(rng: &mut SimpleRng) -> &'static str {
    match rng.below(20) {
        0 => "N",
        1 => " n ",
        2 => "n",
        3 => "y ",
        _ => "Y",
    }
}

fn date(rng: &mut SimpleRng, year: u32) -> String {
    format!("{year}/{:02}/{:02}", 1 + rng.below(12), 1 + rng.below(28))
}

fn scale_record(rng: &mut SimpleRng, id: usize) -> Value {
    let (region, lat, lon, spread) = REGIONS[rng.below(REGIONS.len())];
    let mut rec = json!({
        "縣市": region,
        "latitude": rng.around(lat, spread),
        "longitude": rng.around(lon, spread),
        "店名": format!("攤位{id:03}"),
        "廠牌": rng.pick(&SCALE_BRANDS),
        "型式": format!("SW-{}", 1 + rng.below(9)),
        "器號": format!("{:07}", rng.below(10_000_000)),
        "Max_kg": ([15, 30, 60][rng.below(3)]),
        "e_g": ([5, 10, 20][rng.below(3)]),
        "檢定日期": date(rng, 2023),
        "檢定合格單號": format!("K{:06}", rng.below(1_000_000)),
        "檢查日期": date(rng, 2024),
        "檢查合格單號": format!("C{:06}", rng.below(1_000_000)),
        "檢查合格與否": compliance_flag(rng),
    });
    // A few rows with gaps, as in the published files.
    if id % 17 == 0 {
        rec["latitude"] = Value::Null;
    }
    if id % 11 == 0 {
        rec["型式"] = Value::String(String::new());
        rec["檢定日期"] = Value::Null;
    }
    rec
}

fn weighbridge_record(rng: &mut SimpleRng, id: usize) -> Value {
    let (region, lat, lon, spread) = REGIONS[rng.below(REGIONS.len())];
    let mut rec = json!({
        "縣市": region,
        "latitude": rng.around(lat, spread * 2.0).to_string(),
        "longitude": rng.around(lon, spread * 2.0).to_string(),
        "所有人": rng.pick(&OWNERS),
        "地址": format!("{region}工業路{}號", 1 + rng.below(300)),
        "廠牌": rng.pick(&BRIDGE_BRANDS),
        "型號": format!("WB-{}", 10 + rng.below(90)),
        "器號": format!("{:06}", rng.below(1_000_000)),
        "Max_t": ([30, 50, 80][rng.below(3)]),
        "e_kg": ([10, 20][rng.below(2)]),
        "檢定合格期限": date(rng, 2026),
        "檢定合格單號": format!("W{:06}", rng.below(1_000_000)),
        "檢查日期": date(rng, 2024),
        "檢查合格單號": format!("D{:06}", rng.below(1_000_000)),
        "檢查合格與否": compliance_flag(rng),
    });
    if id % 13 == 0 {
        rec["longitude"] = Value::String("n/a".to_string());
    }
    rec
}

fn write_json(path: &str, rows: &[Value]) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, text)?;
    println!("Wrote {} records to {path}", rows.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    let scales: Vec<Value> = (1..=240).map(|id| scale_record(&mut rng, id)).collect();
    let bridges: Vec<Value> = (1..=60).map(|id| weighbridge_record(&mut rng, id)).collect();

    write_json("scale-data.json", &scales)?;
    write_json("weighbridge-data.json", &bridges)?;
    Ok(())
}
