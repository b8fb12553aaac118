use anyhow::{Context, Result, bail};
use regex::Regex;
use scraper::{Html, Selector};

use lotto645_db::error::LottoError;
use lotto645_db::models::{DRAW_SIZE, Draw, validate_draw};

/// Page officielle des résultats du Lotto 6/45.
pub const RESULT_URL: &str = "https://dhlottery.co.kr/gameResult.do?method=byWin";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

/// Récupère le dernier tirage publié. La page est téléchargée puis passée à
/// `parse_draw_page` ; le tirage extrait est validé avant d'être rendu.
pub fn fetch_latest() -> Result<Draw> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()
        .context("Construction du client HTTP")?;

    let html = client
        .get(RESULT_URL)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(|e| LottoError::Fetch(format!("page officielle injoignable : {}", e)))?;

    let draw = parse_draw_page(&html)?;
    validate_draw(&draw)?;
    Ok(draw)
}

/// Extrait les champs attendus (numéro de tirage, date, six numéros plus
/// bonus, nombre de gagnants au rang 1) du HTML de la page de résultats.
pub fn parse_draw_page(html: &str) -> Result<Draw> {
    let doc = Html::parse_document(html);

    let draw_no = parse_round(&doc)?;
    let date = parse_date(&doc)?;
    let (numbers, bonus) = parse_numbers(&doc)?;
    let winner_count = parse_winner_count(&doc)?;

    Ok(Draw {
        draw_no,
        date,
        numbers,
        bonus,
        winner_count,
    })
}

fn parse_round(doc: &Html) -> Result<u32> {
    let sel_round = Selector::parse("strong#lottoDrwNo").unwrap();
    let text = match doc.select(&sel_round).next() {
        Some(elem) => elem.text().collect::<String>(),
        None => {
            // repli si l'identifiant disparaît : premier <strong> en "NNN회"
            let sel_strong = Selector::parse("strong").unwrap();
            let re = Regex::new(r"\d+회").unwrap();
            match doc
                .select(&sel_strong)
                .map(|e| e.text().collect::<String>())
                .find(|t| re.is_match(t))
            {
                Some(t) => t,
                None => bail!(LottoError::Fetch("numéro de tirage introuvable".to_string())),
            }
        }
    };
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    let round = digits.parse::<u32>().map_err(|_| {
        LottoError::Fetch(format!("numéro de tirage illisible : '{}'", text.trim()))
    })?;
    Ok(round)
}

fn parse_date(doc: &Html) -> Result<String> {
    let sel_desc = Selector::parse("p.desc").unwrap();
    let re = Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일").unwrap();
    for elem in doc.select(&sel_desc) {
        let text = elem.text().collect::<String>();
        if let Some(caps) = re.captures(&text) {
            return Ok(format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]));
        }
    }
    bail!(LottoError::Fetch("date du tirage introuvable".to_string()))
}

fn parse_numbers(doc: &Html) -> Result<([u8; DRAW_SIZE], u8)> {
    let sel_box = Selector::parse("div.win_result").unwrap();
    let sel_ball = Selector::parse("span.ball_645").unwrap();

    let win_box = match doc.select(&sel_box).next() {
        Some(elem) => elem,
        None => bail!(LottoError::Fetch(
            "bloc des numéros gagnants introuvable".to_string()
        )),
    };

    let mut balls = Vec::new();
    for span in win_box.select(&sel_ball) {
        let text = span.text().collect::<String>();
        let n = text
            .trim()
            .parse::<u8>()
            .map_err(|_| LottoError::Fetch(format!("numéro illisible : '{}'", text.trim())))?;
        balls.push(n);
    }
    if balls.len() < DRAW_SIZE + 1 {
        bail!(LottoError::Fetch(format!(
            "{} numéros trouvés au lieu de {}",
            balls.len(),
            DRAW_SIZE + 1
        )));
    }

    let mut numbers: [u8; DRAW_SIZE] = [balls[0], balls[1], balls[2], balls[3], balls[4], balls[5]];
    numbers.sort();
    Ok((numbers, balls[DRAW_SIZE]))
}

fn parse_winner_count(doc: &Html) -> Result<u32> {
    let sel_table = Selector::parse("table.tbl_data").unwrap();
    let sel_row = Selector::parse("tr").unwrap();
    let sel_cell = Selector::parse("td").unwrap();

    let table = match doc.select(&sel_table).next() {
        Some(elem) => elem,
        None => bail!(LottoError::Fetch(
            "tableau des gagnants introuvable".to_string()
        )),
    };
    let row = match table.select(&sel_row).nth(1) {
        Some(elem) => elem,
        None => bail!(LottoError::Fetch("ligne du rang 1 introuvable".to_string())),
    };
    let cell = match row.select(&sel_cell).nth(2) {
        Some(elem) => elem,
        None => bail!(LottoError::Fetch(
            "cellule des gagnants du rang 1 introuvable".to_string()
        )),
    };

    let text = cell.text().collect::<String>();
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    let count = digits.parse::<u32>().map_err(|_| {
        LottoError::Fetch(format!("nombre de gagnants illisible : '{}'", text.trim()))
    })?;
    Ok(count)
}
